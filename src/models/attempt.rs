use serde::{Deserialize, Serialize};

use crate::models::question::QuestionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Idle,
    Running,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    SingleQuestion,
    AllQuestions,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::SingleQuestion => DisplayMode::AllQuestions,
            DisplayMode::AllQuestions => DisplayMode::SingleQuestion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: QuestionId,
    pub question_text: String,
    pub given_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points_earned: f64,
    pub max_points: f64,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub correct_count: usize,
    pub total_count: usize,
    pub earned_points: f64,
    pub max_points: f64,
    pub graded: Vec<GradedAnswer>,
}

impl Score {
    pub fn percentage(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            (self.correct_count as f64 / self.total_count as f64) * 100.0
        }
    }

    pub fn passed(&self, passing_score: f64) -> bool {
        self.percentage() >= passing_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { attempt_number: u32 },
    /// Normal refusal once the budget is spent; not an error.
    AttemptsExhausted { used: u32, max: u32 },
    NotIdle(AttemptState),
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    pub fn message(&self) -> String {
        match self {
            StartOutcome::Started { attempt_number } => {
                format!("Attempt {} started", attempt_number)
            }
            StartOutcome::AttemptsExhausted { used, max } => format!(
                "You have used {} of {} allowed attempts for this assessment",
                used, max
            ),
            StartOutcome::NotIdle(AttemptState::Running) => {
                "An attempt is already in progress".to_string()
            }
            StartOutcome::NotIdle(_) => {
                "Review the result and reset before starting again".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Recorded,
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_and_pass_mark() {
        let score = Score {
            correct_count: 3,
            total_count: 4,
            earned_points: 3.0,
            max_points: 4.0,
            graded: vec![],
        };
        assert_eq!(score.percentage(), 75.0);
        assert!(score.passed(75.0));
        assert!(!score.passed(80.0));
    }

    #[test]
    fn empty_score_is_zero_percent() {
        let score = Score {
            correct_count: 0,
            total_count: 0,
            earned_points: 0.0,
            max_points: 0.0,
            graded: vec![],
        };
        assert_eq!(score.percentage(), 0.0);
    }

    #[test]
    fn exhausted_message_names_the_budget() {
        let msg = StartOutcome::AttemptsExhausted { used: 2, max: 2 }.message();
        assert!(msg.contains("2 of 2"));
    }
}
