use std::collections::HashMap;

use assessment_client::models::assessment::Assessment;
use assessment_client::models::attempt::{AttemptState, StartOutcome};
use assessment_client::models::question::{Question, QuestionId};
use assessment_client::services::attempt_counter::{
    attempt_key, AttemptCounterStore, FileCounterStore, MemoryCounterStore,
};
use assessment_client::services::grading_service::GradingService;
use assessment_client::session::{AssessmentSession, ManualScheduler, QuestionNavigator};
use serde_json::json;

fn assessment(id: &str, time_limit_minutes: i64, max_attempts: i64) -> Assessment {
    serde_json::from_value(json!({
        "_id": id,
        "title": "Chapter quiz",
        "subject_code": "MLN122",
        "time_limit_minutes": time_limit_minutes,
        "max_attempts": max_attempts,
        "is_published": true
    }))
    .expect("assessment json")
}

fn two_questions() -> Vec<Question> {
    vec![
        Question::multiple_choice("1", "First", vec!["A".into(), "B".into(), "C".into()], "A"),
        Question::multiple_choice("2", "Second", vec!["A".into(), "B".into(), "C".into()], "B"),
    ]
}

fn session_with(
    counter: MemoryCounterStore,
    assessment: Assessment,
    questions: Vec<Question>,
) -> AssessmentSession<MemoryCounterStore, ManualScheduler> {
    let mut session = AssessmentSession::new(counter, ManualScheduler::new());
    session.load(assessment, questions);
    session
}

#[test]
fn successful_starts_never_exceed_max_attempts() {
    let counter = MemoryCounterStore::new();
    let mut session = session_with(counter.clone(), assessment("a1", 1, 3), two_questions());

    let mut started = 0;
    for _ in 0..6 {
        match session.start().expect("start") {
            StartOutcome::Started { .. } => {
                started += 1;
                session.submit().expect("score");
                assert!(session.reset());
            }
            StartOutcome::AttemptsExhausted { used, max } => {
                assert_eq!((used, max), (3, 3));
                assert_eq!(session.attempt_number(), 3);
            }
            StartOutcome::NotIdle(state) => panic!("unexpected state {:?}", state),
        }
    }

    assert_eq!(started, 3);
    assert_eq!(counter.get(&attempt_key("a1")).expect("get"), 3);
    assert_eq!(session.state(), AttemptState::Idle);
}

#[test]
fn start_while_running_is_refused_without_consuming() {
    let counter = MemoryCounterStore::new();
    let mut session = session_with(counter.clone(), assessment("a1", 1, 5), two_questions());

    assert!(session.start().expect("start").is_started());
    assert_eq!(
        session.start().expect("start"),
        StartOutcome::NotIdle(AttemptState::Running)
    );
    assert_eq!(counter.get(&attempt_key("a1")).expect("get"), 1);
    assert_eq!(session.scheduler().active_count(), 1);
}

#[test]
fn clock_counts_down_one_per_tick_and_stops_at_zero() {
    let mut session = session_with(
        MemoryCounterStore::new(),
        assessment("a1", 1, 1),
        two_questions(),
    );
    session.start().expect("start");
    assert_eq!(session.time_left_seconds(), 60);

    let mut previous = session.time_left_seconds();
    let mut forced = Vec::new();
    for _ in 0..75 {
        if let Some(score) = session.tick() {
            forced.push(score);
        }
        let now = session.time_left_seconds();
        if previous > 0 {
            assert_eq!(now, previous - 1);
        } else {
            assert_eq!(now, 0);
        }
        previous = now;
    }

    assert_eq!(forced.len(), 1);
    assert_eq!(session.state(), AttemptState::Submitted);
    assert!(!session.is_active());
}

#[test]
fn manual_submit_stops_the_clock() {
    let mut session = session_with(
        MemoryCounterStore::new(),
        assessment("a1", 1, 1),
        two_questions(),
    );
    session.start().expect("start");
    session.tick();
    session.tick();
    session.submit().expect("score");

    assert_eq!(session.time_left_seconds(), 58);
    assert!(session.tick().is_none());
    assert_eq!(session.time_left_seconds(), 58);
}

#[test]
fn manual_submit_and_expiry_in_the_same_turn_score_once() {
    let counter = MemoryCounterStore::new();
    let mut session = session_with(counter.clone(), assessment("a1", 1, 2), two_questions());
    session.start().expect("start");
    for _ in 0..59 {
        assert!(session.tick().is_none());
    }

    let manual = session.submit();
    let expiry = session.tick();
    assert!(manual.is_some());
    assert!(expiry.is_none());

    session.reset();
    session.start().expect("start");
    for _ in 0..59 {
        session.tick();
    }
    let expiry = session.tick();
    let manual = session.submit();
    assert!(expiry.is_some());
    assert!(manual.is_none());

    assert_eq!(counter.get(&attempt_key("a1")).expect("get"), 2);
}

#[test]
fn stale_timer_fires_are_ignored() {
    let mut session = session_with(
        MemoryCounterStore::new(),
        assessment("a1", 1, 2),
        two_questions(),
    );
    session.start().expect("start");
    session.submit();
    session.reset();
    session.start().expect("start");

    let stale = session.scheduler().cancelled()[0];
    assert!(session.on_timer(stale).is_none());
    assert_eq!(session.time_left_seconds(), 60);
}

#[test]
fn scoring_trims_and_counts_missing_answers_as_wrong() {
    let questions = vec![
        Question::short_answer("1", "First", "A"),
        Question::short_answer("2", "Second", "B"),
    ];

    let answers: HashMap<QuestionId, String> =
        [(QuestionId::from("1"), "A".to_string()), (QuestionId::from("2"), "c".to_string())]
            .into_iter()
            .collect();
    let score = GradingService::score(&questions, &answers);
    assert_eq!((score.correct_count, score.total_count), (1, 2));

    let mut session = session_with(MemoryCounterStore::new(), assessment("a1", 1, 1), questions);
    session.start().expect("start");
    session.record_answer(&QuestionId::from("1"), " A ");
    let score = session.submit().expect("score");
    assert_eq!((score.correct_count, score.total_count), (1, 2));
}

#[test]
fn reset_does_not_give_back_the_attempt() {
    let counter = MemoryCounterStore::new();
    let mut session = session_with(counter.clone(), assessment("a1", 1, 1), two_questions());

    session.start().expect("start");
    session.submit();
    let attempt_number = session.attempt_number();
    assert!(session.reset());
    assert_eq!(session.attempt_number(), attempt_number);
    assert!(!session.reset());

    assert!(matches!(
        session.start().expect("start"),
        StartOutcome::AttemptsExhausted { used: 1, max: 1 }
    ));
    assert_eq!(counter.get(&attempt_key("a1")).expect("get"), 1);
}

#[test]
fn navigator_clamps_at_both_ends() {
    let mut nav = QuestionNavigator::new(5);
    assert_eq!(nav.previous(), 0);
    for _ in 0..10 {
        nav.next();
    }
    assert_eq!(nav.index(), 4);
    assert_eq!(nav.next(), 4);

    let questions: Vec<Question> = (1..=5)
        .map(|i| Question::short_answer(i.to_string(), format!("Q{}", i), "x"))
        .collect();
    let mut session = session_with(MemoryCounterStore::new(), assessment("a1", 1, 1), questions);
    assert_eq!(session.previous_question(), 0);
    assert_eq!(session.go_to_question(17), 4);
    assert_eq!(session.next_question(), 4);
}

#[test]
fn single_attempt_runs_out_of_time_and_locks() {
    let mut session = session_with(
        MemoryCounterStore::new(),
        assessment("final", 1, 1),
        vec![Question::short_answer("q1", "Say X", "X")],
    );

    assert_eq!(
        session.start().expect("start"),
        StartOutcome::Started { attempt_number: 1 }
    );
    session.record_answer(&QuestionId::from("q1"), "X");

    let mut score = None;
    for _ in 0..60 {
        if let Some(s) = session.tick() {
            score = Some(s);
        }
    }
    let score = score.expect("forced submit");
    assert_eq!((score.correct_count, score.total_count), (1, 1));
    assert!(!session.is_active());

    session.reset();
    assert!(!session.start().expect("start").is_started());
}

#[test]
fn counters_survive_a_restart_when_file_backed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("attempts.json");

    {
        let counter = FileCounterStore::open(&path).expect("open");
        let mut session = AssessmentSession::new(counter, ManualScheduler::new());
        session.load(assessment("a1", 1, 1), two_questions());
        assert!(session.start().expect("start").is_started());
    }

    let counter = FileCounterStore::open(&path).expect("reopen");
    let mut session = AssessmentSession::new(counter, ManualScheduler::new());
    session.load(assessment("a1", 1, 1), two_questions());
    assert_eq!(session.attempts_remaining().expect("remaining"), Some(0));
    assert!(matches!(
        session.start().expect("start"),
        StartOutcome::AttemptsExhausted { .. }
    ));
}

#[test]
fn colliding_question_ids_still_get_one_answer_each() {
    let questions: Vec<Question> = serde_json::from_value(json!([
        { "id": "2", "question_text": "First", "correct_answer": "a" },
        { "question_text": "Second", "correct_answer": "b" }
    ]))
    .expect("questions json");
    let mut session = session_with(MemoryCounterStore::new(), assessment("a1", 1, 1), questions);
    session.start().expect("start");

    session.answer_current("a");
    session.next_question();
    session.answer_current("b");
    assert_eq!(session.answers().len(), 2);

    let score = session.submit().expect("score");
    assert_eq!((score.correct_count, score.total_count), (2, 2));
}
