use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::error::Result;
use crate::models::attempt::{AnswerOutcome, DisplayMode, Score};
use crate::models::question::{Question, QuestionKind};
use crate::services::attempt_counter::AttemptCounterStore;
use crate::session::controller::AssessmentSession;
use crate::session::scheduler::{Scheduler, TimerId};
use crate::utils::time::format_countdown;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    GoTo(usize),
    ToggleMode,
    Time,
    Submit,
    Quit,
    Help,
    Answer(String),
}

/// Lines starting with `:` are commands, anything else answers the current
/// question. `:goto` takes a 1-based question number.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Answer(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let command = match parts.next()?.to_ascii_lowercase().as_str() {
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Previous,
        "goto" | "g" => {
            let number: usize = parts.next()?.parse().ok()?;
            Command::GoTo(number.saturating_sub(1))
        }
        "mode" | "m" => Command::ToggleMode,
        "time" | "t" => Command::Time,
        "submit" | "s" => Command::Submit,
        "quit" | "q" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        _ => return None,
    };
    Some(command)
}

/// Text equal to one of the options is taken as that option. Otherwise a
/// single letter picks the option under that label; anything else is taken
/// verbatim.
pub fn resolve_answer(question: &Question, raw: &str) -> String {
    if let QuestionKind::MultipleChoice { options } = &question.kind {
        if options.iter().any(|o| o == raw) {
            return raw.to_string();
        }
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
                if let Some(option) = options.get(idx) {
                    return option.clone();
                }
            }
        }
    }
    raw.to_string()
}

fn option_label(idx: usize) -> char {
    (b'A' + (idx % 26) as u8) as char
}

fn write_question<W: Write>(
    out: &mut W,
    number: usize,
    total: usize,
    question: &Question,
    answer: Option<&str>,
) -> Result<()> {
    writeln!(out, "Question {}/{}: {}", number, total, question.question_text)?;
    for (idx, option) in question.kind.options().iter().enumerate() {
        let marker = if answer == Some(option.as_str()) { "*" } else { " " };
        writeln!(out, " {} {}. {}", marker, option_label(idx), option)?;
    }
    if let (QuestionKind::ShortAnswer, Some(answer)) = (&question.kind, answer) {
        writeln!(out, "   Your answer: {}", answer)?;
    }
    Ok(())
}

pub fn render<C, S, W>(session: &AssessmentSession<C, S>, out: &mut W) -> Result<()>
where
    C: AttemptCounterStore,
    S: Scheduler,
    W: Write,
{
    let total = session.questions().len();
    writeln!(out, "[{}]", format_countdown(session.time_left_seconds()))?;
    match session.display_mode() {
        DisplayMode::SingleQuestion => {
            if let Some(question) = session.current_question() {
                let number = session.navigator().index() + 1;
                write_question(out, number, total, question, session.answer_for(&question.id))?;
            }
        }
        DisplayMode::AllQuestions => {
            for (idx, question) in session.questions().iter().enumerate() {
                write_question(out, idx + 1, total, question, session.answer_for(&question.id))?;
            }
        }
    }
    Ok(())
}

pub fn write_score<W: Write>(out: &mut W, score: &Score, passing_score: f64) -> Result<()> {
    writeln!(
        out,
        "Score: {}/{} correct ({:.0}%), {} of {} points",
        score.correct_count,
        score.total_count,
        score.percentage(),
        score.earned_points,
        score.max_points
    )?;
    if passing_score > 0.0 {
        let verdict = if score.passed(passing_score) { "Passed" } else { "Not passed" };
        writeln!(out, "{} (pass mark {:.0}%)", verdict, passing_score)?;
    }
    for (idx, graded) in score.graded.iter().enumerate() {
        let mark = if graded.is_correct { "correct" } else { "wrong" };
        writeln!(
            out,
            "{}. {} [{}] your answer: {}, correct: {}",
            idx + 1,
            graded.question_text,
            mark,
            graded.given_answer.as_deref().unwrap_or("-"),
            graded.correct_answer
        )?;
        if let Some(explanation) = &graded.explanation {
            writeln!(out, "   {}", explanation)?;
        }
    }
    Ok(())
}

const HELP: &str = "Type an answer (or an option letter) for the current question.
Commands: :next :prev :goto N :mode :time :submit :quit";

/// Drives a started attempt until it is submitted by the operator, by the
/// clock, or by end of input. `:quit` abandons the attempt and returns
/// `None`.
pub async fn run_attempt<C, S, R, W>(
    session: &mut AssessmentSession<C, S>,
    timers: &mut UnboundedReceiver<TimerId>,
    input: R,
    out: &mut W,
) -> Result<Option<Score>>
where
    C: AttemptCounterStore,
    S: Scheduler,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if !session.is_active() {
        return Ok(None);
    }
    writeln!(out, "{}", HELP)?;
    render(session, out)?;
    let mut lines = input.lines();

    loop {
        tokio::select! {
            Some(id) = timers.recv() => {
                if let Some(score) = session.on_timer(id) {
                    writeln!(out, "Time is up, your answers were submitted.")?;
                    return Ok(Some(score));
                }
                let left = session.time_left_seconds();
                if session.is_active() && (left % 60 == 0 || left == 30 || left <= 10) {
                    writeln!(out, "[{} left]", format_countdown(left))?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed, submitting");
                    return Ok(session.submit());
                };
                let Some(command) = parse_command(&line) else {
                    writeln!(out, "Unknown command. {}", HELP)?;
                    continue;
                };
                match command {
                    Command::Next => {
                        session.next_question();
                        render(session, out)?;
                    }
                    Command::Previous => {
                        session.previous_question();
                        render(session, out)?;
                    }
                    Command::GoTo(index) => {
                        session.go_to_question(index);
                        render(session, out)?;
                    }
                    Command::ToggleMode => {
                        session.toggle_display_mode();
                        render(session, out)?;
                    }
                    Command::Time => {
                        writeln!(out, "[{} left]", format_countdown(session.time_left_seconds()))?;
                    }
                    Command::Help => writeln!(out, "{}", HELP)?,
                    Command::Submit => return Ok(session.submit()),
                    Command::Quit => {
                        session.cancel();
                        writeln!(out, "Attempt abandoned.")?;
                        return Ok(None);
                    }
                    Command::Answer(raw) => {
                        let Some(question) = session.current_question() else {
                            continue;
                        };
                        let value = resolve_answer(question, &raw);
                        if session.answer_current(value) == AnswerOutcome::Recorded {
                            let at_end = session.navigator().is_last();
                            if session.display_mode() == DisplayMode::SingleQuestion && !at_end {
                                session.next_question();
                            }
                            render(session, out)?;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_answers_are_told_apart() {
        assert_eq!(parse_command(":next"), Some(Command::Next));
        assert_eq!(parse_command(" :GOTO 3 "), Some(Command::GoTo(2)));
        assert_eq!(parse_command(":goto 0"), Some(Command::GoTo(0)));
        assert_eq!(parse_command(":goto x"), None);
        assert_eq!(parse_command(":dance"), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("Paris"), Some(Command::Answer("Paris".into())));
    }

    #[test]
    fn option_letters_map_to_option_text() {
        let q = Question::multiple_choice(
            "1",
            "Capital of France?",
            vec!["Berlin".into(), "Paris".into()],
            "Paris",
        );
        assert_eq!(resolve_answer(&q, "b"), "Paris");
        assert_eq!(resolve_answer(&q, "Z"), "Z");
        assert_eq!(resolve_answer(&q, "Paris"), "Paris");

        let short = Question::short_answer("2", "Say a letter", "a");
        assert_eq!(resolve_answer(&short, "a"), "a");
    }

    #[test]
    fn option_text_wins_over_letter_position() {
        let q = Question::multiple_choice(
            "1",
            "Which letter?",
            vec!["D".into(), "C".into(), "B".into(), "A".into()],
            "A",
        );
        assert_eq!(resolve_answer(&q, "A"), "A");
        assert_eq!(resolve_answer(&q, "D"), "D");
        assert_eq!(resolve_answer(&q, "a"), "D");
    }

    #[test]
    fn score_report_lists_every_question() {
        use crate::models::attempt::GradedAnswer;
        use crate::models::question::QuestionId;

        let score = Score {
            correct_count: 1,
            total_count: 2,
            earned_points: 1.0,
            max_points: 2.0,
            graded: vec![
                GradedAnswer {
                    question_id: QuestionId::from("1"),
                    question_text: "One".into(),
                    given_answer: Some("a".into()),
                    correct_answer: "a".into(),
                    is_correct: true,
                    points_earned: 1.0,
                    max_points: 1.0,
                    explanation: None,
                },
                GradedAnswer {
                    question_id: QuestionId::from("2"),
                    question_text: "Two".into(),
                    given_answer: None,
                    correct_answer: "b".into(),
                    is_correct: false,
                    points_earned: 0.0,
                    max_points: 1.0,
                    explanation: Some("b it is".into()),
                },
            ],
        };
        let mut out = Vec::new();
        write_score(&mut out, &score, 60.0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1/2 correct (50%)"));
        assert!(text.contains("Not passed"));
        assert!(text.contains("your answer: -"));
        assert!(text.contains("b it is"));
    }
}
