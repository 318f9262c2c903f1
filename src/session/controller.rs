use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::attempt::{AnswerOutcome, AttemptState, DisplayMode, Score, StartOutcome};
use crate::models::question::{assign_question_ids, Question, QuestionId};
use crate::services::attempt_counter::{attempt_key, AttemptCounterStore};
use crate::services::grading_service::GradingService;
use crate::session::navigator::QuestionNavigator;
use crate::session::scheduler::{Scheduler, TimerId};

/// One operator's timed attempt at a loaded assessment.
///
/// `Idle --start--> Running --submit/timeout--> Submitted --reset--> Idle`.
/// The consumed-attempt counter lives in the injected store; everything
/// else is session-local and dropped with the session.
pub struct AssessmentSession<C: AttemptCounterStore, S: Scheduler> {
    counter: C,
    scheduler: S,
    assessment: Option<Assessment>,
    questions: Vec<Question>,
    navigator: QuestionNavigator,
    display_mode: DisplayMode,
    state: AttemptState,
    answers: HashMap<QuestionId, String>,
    time_left_seconds: u32,
    active_timer: Option<TimerId>,
    attempt_number: u32,
    score: Option<Score>,
}

impl<C: AttemptCounterStore, S: Scheduler> AssessmentSession<C, S> {
    pub fn new(counter: C, scheduler: S) -> Self {
        Self {
            counter,
            scheduler,
            assessment: None,
            questions: Vec::new(),
            navigator: QuestionNavigator::default(),
            display_mode: DisplayMode::default(),
            state: AttemptState::Idle,
            answers: HashMap::new(),
            time_left_seconds: 0,
            active_timer: None,
            attempt_number: 0,
            score: None,
        }
    }

    /// Switches to another assessment. Any running attempt is abandoned
    /// without scoring.
    pub fn load(&mut self, assessment: Assessment, questions: Vec<Question>) {
        self.cancel_timer();
        let questions = assign_question_ids(questions);
        info!(
            assessment_id = %assessment.id,
            questions = questions.len(),
            "Assessment loaded"
        );
        self.navigator.reload(questions.len());
        self.questions = questions;
        self.assessment = Some(assessment);
        self.answers.clear();
        self.score = None;
        self.time_left_seconds = 0;
        self.attempt_number = 0;
        self.state = AttemptState::Idle;
    }

    pub fn start(&mut self) -> Result<StartOutcome> {
        let assessment = self.assessment.as_ref().ok_or_else(|| {
            Error::InvalidConfiguration("No assessment selected".to_string())
        })?;
        let limits = assessment.session_limits()?;
        if self.questions.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "Assessment '{}' has no questions",
                assessment.title
            )));
        }

        let key = attempt_key(&assessment.id);
        let used = self.counter.get(&key)?;
        if used >= limits.max_attempts {
            warn!(
                assessment_id = %assessment.id,
                used,
                max = limits.max_attempts,
                "Attempt limit reached"
            );
            return Ok(StartOutcome::AttemptsExhausted {
                used,
                max: limits.max_attempts,
            });
        }
        if self.state != AttemptState::Idle {
            return Ok(StartOutcome::NotIdle(self.state));
        }

        let attempt_number = used + 1;
        self.counter.set(&key, attempt_number)?;
        info!(
            assessment_id = %assessment.id,
            attempt_number,
            time_limit_seconds = limits.time_limit_seconds,
            "Attempt started"
        );

        self.cancel_timer();
        self.answers.clear();
        self.score = None;
        self.navigator.reset();
        self.time_left_seconds = limits.time_limit_seconds;
        self.attempt_number = attempt_number;
        self.active_timer = Some(self.scheduler.schedule_every_second());
        self.state = AttemptState::Running;

        Ok(StartOutcome::Started { attempt_number })
    }

    /// Overwrites any earlier answer. Values are not checked against the
    /// options; short-answer questions take free text.
    pub fn record_answer(&mut self, question_id: &QuestionId, value: impl Into<String>) -> AnswerOutcome {
        if self.state != AttemptState::Running {
            debug!(%question_id, state = ?self.state, "Answer ignored outside a running attempt");
            return AnswerOutcome::Ignored;
        }
        if !self.questions.iter().any(|q| &q.id == question_id) {
            debug!(%question_id, "Answer ignored for unknown question");
            return AnswerOutcome::Ignored;
        }
        self.answers.insert(question_id.clone(), value.into());
        AnswerOutcome::Recorded
    }

    /// Answers the question under the navigator cursor.
    pub fn answer_current(&mut self, value: impl Into<String>) -> AnswerOutcome {
        match self.current_question().map(|q| q.id.clone()) {
            Some(id) => self.record_answer(&id, value),
            None => AnswerOutcome::Ignored,
        }
    }

    /// One second of wall-clock time. Reaching zero forces the submit; the
    /// returned score is that forced submit's result.
    pub fn tick(&mut self) -> Option<Score> {
        if self.state != AttemptState::Running || self.active_timer.is_none() {
            return None;
        }
        self.time_left_seconds = self.time_left_seconds.saturating_sub(1);
        if self.time_left_seconds == 0 {
            info!(attempt_number = self.attempt_number, "Time is up, submitting");
            return self.submit();
        }
        None
    }

    /// Entry point for real timers: fires from a cancelled timer are dropped.
    pub fn on_timer(&mut self, id: TimerId) -> Option<Score> {
        if self.active_timer != Some(id) {
            debug!(?id, "Stale timer fire ignored");
            return None;
        }
        self.tick()
    }

    /// Scores the running attempt. Taking the timer handle is the first
    /// step, so whichever of the manual submit and the timeout gets here
    /// second finds nothing to do.
    pub fn submit(&mut self) -> Option<Score> {
        let timer = self.active_timer.take()?;
        self.scheduler.cancel(timer);
        if self.state != AttemptState::Running {
            return None;
        }

        self.state = AttemptState::Submitted;
        let score = GradingService::score(&self.questions, &self.answers);
        info!(
            attempt_number = self.attempt_number,
            correct = score.correct_count,
            total = score.total_count,
            time_left_seconds = self.time_left_seconds,
            "Attempt submitted"
        );
        self.score = Some(score.clone());
        Some(score)
    }

    /// "Try again" view reset. Does not give back the consumed attempt.
    pub fn reset(&mut self) -> bool {
        if self.state != AttemptState::Submitted {
            return false;
        }
        self.answers.clear();
        self.score = None;
        self.navigator.reset();
        self.state = AttemptState::Idle;
        true
    }

    /// Leaving the assessment view: stops the timer and drops the attempt
    /// unscored. The consumed attempt stays consumed.
    pub fn cancel(&mut self) {
        self.cancel_timer();
        if self.state == AttemptState::Running {
            warn!(attempt_number = self.attempt_number, "Running attempt abandoned");
            self.answers.clear();
            self.state = AttemptState::Idle;
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.active_timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    pub fn next_question(&mut self) -> usize {
        self.navigator.next()
    }

    pub fn previous_question(&mut self) -> usize {
        self.navigator.previous()
    }

    pub fn go_to_question(&mut self, index: usize) -> usize {
        self.navigator.go_to(index)
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AttemptState::Running
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn time_left_seconds(&self) -> u32 {
        self.time_left_seconds
    }

    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        self.assessment.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.answers
    }

    pub fn answer_for(&self, question_id: &QuestionId) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    pub fn navigator(&self) -> &QuestionNavigator {
        &self.navigator
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.navigator.index())
    }

    pub fn attempts_used(&self) -> Result<u32> {
        match &self.assessment {
            Some(a) => self.counter.get(&attempt_key(&a.id)),
            None => Ok(0),
        }
    }

    pub fn attempts_remaining(&self) -> Result<Option<u32>> {
        let Some(assessment) = &self.assessment else {
            return Ok(None);
        };
        let max = match assessment.session_limits() {
            Ok(limits) => limits.max_attempts,
            Err(_) => return Ok(None),
        };
        Ok(Some(max.saturating_sub(self.attempts_used()?)))
    }

    pub fn counter_store(&self) -> &C {
        &self.counter
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<C: AttemptCounterStore, S: Scheduler> Drop for AssessmentSession<C, S> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
