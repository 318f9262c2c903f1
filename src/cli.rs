use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::dto::assessment_dto::AssessmentFilter;
use crate::dto::question_dto::{NewQuestion, QuestionPatch};
use crate::models::question::QuestionKind;

#[derive(Parser, Debug)]
#[command(name = "assessment-client", version)]
#[command(about = "Take and author timed assessments against the portal's assessment store")]
#[command(
    after_help = "Environment:\n  ASSESSMENT_API_URL     Store base URL (default http://127.0.0.1:8000)\n  ASSESSMENT_API_TOKEN   Bearer token for admin calls\n  ATTEMPT_STORE_PATH     Local attempt counter file\n  RUST_LOG               Log filter (default info)\n  LOG_FORMAT             Set to json for JSON log lines"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List assessments
    List {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = false)]
        published: bool,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one assessment with its questions
    Show { id: String },
    /// Take a timed attempt, reading answers from stdin
    Take {
        id: String,
        /// Start with every question on screen
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Create an empty quiz
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        time_limit: Option<i64>,
        #[arg(long, default_value_t = 1)]
        max_attempts: i64,
        #[arg(long, default_value_t = 0.0)]
        passing_score: f64,
    },
    /// Delete an assessment
    Delete { id: String },
    /// Write the question bank to a JSON file
    Export {
        id: String,
        /// Defaults to a timestamped name in the current directory
        file: Option<PathBuf>,
    },
    /// Create questions from a JSON array file
    Import { id: String, file: PathBuf },
    Publish { id: String, subject: String },
    Unpublish { id: String },
    /// Change the time limit and attempt budget
    Settings {
        id: String,
        #[arg(long)]
        time_limit: Option<i64>,
        #[arg(long)]
        max_attempts: Option<i64>,
    },
    AddQuestion {
        id: String,
        #[arg(long)]
        text: String,
        #[arg(long, value_enum, default_value_t = QuestionKindArg::MultipleChoice)]
        kind: QuestionKindArg,
        /// Repeat once per option
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long)]
        answer: String,
        #[arg(long)]
        explanation: Option<String>,
    },
    /// Change fields of the question at a 0-based position
    EditQuestion {
        id: String,
        index: usize,
        #[arg(long)]
        text: Option<String>,
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long)]
        answer: Option<String>,
        #[arg(long)]
        explanation: Option<String>,
    },
    /// Delete a question by its 0-based position
    DeleteQuestion { id: String, index: usize },
    /// List the subjects an assessment can be published under
    Subjects,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QuestionKindArg {
    MultipleChoice,
    ShortAnswer,
}

pub fn list_filter(
    subject: Option<String>,
    published: bool,
    skip: Option<u32>,
    limit: Option<u32>,
) -> AssessmentFilter {
    AssessmentFilter {
        subject_code: subject,
        published_only: published,
        skip,
        limit,
    }
}

pub fn new_question(
    text: String,
    kind: QuestionKindArg,
    options: Vec<String>,
    answer: String,
    explanation: Option<String>,
) -> NewQuestion {
    let kind = match kind {
        QuestionKindArg::MultipleChoice => QuestionKind::MultipleChoice { options },
        QuestionKindArg::ShortAnswer => QuestionKind::ShortAnswer,
    };
    let question = NewQuestion::new(text, kind, answer);
    match explanation {
        Some(explanation) => question.with_explanation(explanation),
        None => question,
    }
}

/// An empty `--option` list leaves the options untouched.
pub fn question_patch(
    text: Option<String>,
    options: Vec<String>,
    answer: Option<String>,
    explanation: Option<String>,
) -> QuestionPatch {
    QuestionPatch {
        question_text: text,
        options: (!options.is_empty()).then_some(options),
        correct_answer: answer,
        explanation,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;

    #[test]
    fn add_question_collects_repeated_options() {
        let cli = Cli::try_parse_from([
            "assessment-client",
            "add-question",
            "a1",
            "--text",
            "Pick",
            "--option",
            "x",
            "--option",
            "y",
            "--answer",
            "y",
        ])
        .unwrap();
        let Command::AddQuestion { options, kind, .. } = cli.command else {
            panic!("expected add-question");
        };
        assert_eq!(options, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(kind, QuestionKindArg::MultipleChoice);
    }

    #[test]
    fn short_answer_questions_drop_options() {
        let q = new_question(
            "Say hi".into(),
            QuestionKindArg::ShortAnswer,
            vec!["ignored".into()],
            "hi".into(),
            Some("greeting".into()),
        );
        assert_eq!(q.question_type, QuestionType::ShortAnswer);
        assert!(q.options.is_none());
        assert_eq!(q.explanation.as_deref(), Some("greeting"));
    }

    #[test]
    fn edit_without_options_keeps_them() {
        let patch = question_patch(None, vec![], Some("B".into()), None);
        assert!(patch.options.is_none());
        assert_eq!(patch.correct_answer.as_deref(), Some("B"));
        assert!(question_patch(None, vec![], None, None).is_empty());
    }

    #[test]
    fn take_accepts_all_flag() {
        let cli = Cli::try_parse_from(["assessment-client", "take", "a1", "--all"]).unwrap();
        assert!(matches!(cli.command, Command::Take { all: true, .. }));
    }
}
