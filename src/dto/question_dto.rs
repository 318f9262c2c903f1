use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{default_points, QuestionKind, QuestionType};

fn default_question_type() -> QuestionType {
    QuestionType::MultipleChoice
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question_text: String,
    /// Import files routinely omit the type; they are multiple choice.
    #[serde(default = "default_question_type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: f64,
}

impl NewQuestion {
    pub fn new(
        question_text: impl Into<String>,
        kind: QuestionKind,
        correct_answer: impl Into<String>,
    ) -> Self {
        let question_type = kind.question_type();
        let options = match kind {
            QuestionKind::MultipleChoice { options } => Some(options),
            QuestionKind::ShortAnswer => None,
        };
        Self {
            question_text: question_text.into(),
            question_type,
            options,
            correct_answer: correct_answer.into(),
            explanation: None,
            points: default_points(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuestionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Correct answer cannot be empty"))]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
