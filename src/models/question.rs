use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::utils::flexible::deserialize_optional_id;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
    Essay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    ShortAnswer,
}

impl QuestionKind {
    /// Resolves the wire type/options pair. Without an explicit type the
    /// presence of options decides.
    pub fn from_wire(question_type: Option<QuestionType>, options: Option<Vec<String>>) -> Self {
        let options = options.unwrap_or_default();
        match question_type {
            Some(QuestionType::MultipleChoice) => QuestionKind::MultipleChoice { options },
            Some(QuestionType::TrueFalse) if options.is_empty() => QuestionKind::MultipleChoice {
                options: vec!["true".to_string(), "false".to_string()],
            },
            Some(QuestionType::TrueFalse) => QuestionKind::MultipleChoice { options },
            Some(QuestionType::ShortAnswer) | Some(QuestionType::Essay) => QuestionKind::ShortAnswer,
            None if options.is_empty() => QuestionKind::ShortAnswer,
            None => QuestionKind::MultipleChoice { options },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::ShortAnswer => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireQuestion", into = "WireQuestion")]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub kind: QuestionKind,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub points: f64,
}

impl Question {
    pub fn multiple_choice(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question_text: text.into(),
            kind: QuestionKind::MultipleChoice { options },
            correct_answer: correct_answer.into(),
            explanation: None,
            points: default_points(),
        }
    }

    pub fn short_answer(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question_text: text.into(),
            kind: QuestionKind::ShortAnswer,
            correct_answer: correct_answer.into(),
            explanation: None,
            points: default_points(),
        }
    }
}

/// JSON shape used by the assessment store and by import/export files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireQuestion {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: f64,
}

pub(crate) fn default_points() -> f64 {
    1.0
}

impl From<WireQuestion> for Question {
    fn from(wire: WireQuestion) -> Self {
        Self {
            id: QuestionId(wire.id.unwrap_or_default()),
            question_text: wire.question_text,
            kind: QuestionKind::from_wire(wire.question_type, wire.options),
            correct_answer: wire.correct_answer,
            explanation: wire.explanation,
            points: wire.points,
        }
    }
}

impl From<Question> for WireQuestion {
    fn from(q: Question) -> Self {
        let question_type = q.kind.question_type();
        let options = match q.kind {
            QuestionKind::MultipleChoice { options } => Some(options),
            QuestionKind::ShortAnswer => None,
        };
        Self {
            id: (!q.id.is_unassigned()).then_some(q.id.0),
            question_text: q.question_text,
            question_type: Some(question_type),
            options,
            correct_answer: q.correct_answer,
            explanation: q.explanation,
            points: q.points,
        }
    }
}

/// The store addresses questions by position and does not hand out ids, so
/// unassigned ids are filled from the 1-based position. If the result holds
/// a duplicate, every id is taken from the position instead.
pub fn assign_question_ids(questions: Vec<Question>) -> Vec<Question> {
    let mut questions: Vec<Question> = questions
        .into_iter()
        .enumerate()
        .map(|(idx, mut q)| {
            if q.id.is_unassigned() {
                q.id = QuestionId((idx + 1).to_string());
            }
            q
        })
        .collect();

    let mut seen = HashSet::with_capacity(questions.len());
    if !questions.iter().all(|q| seen.insert(q.id.clone())) {
        for (idx, q) in questions.iter_mut().enumerate() {
            q.id = QuestionId((idx + 1).to_string());
        }
    }
    questions
}
