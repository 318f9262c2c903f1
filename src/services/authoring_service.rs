use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};

use crate::dto::assessment_dto::AssessmentPatch;
use crate::dto::question_dto::{NewQuestion, QuestionPatch};
use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::question::{Question, WireQuestion};
use crate::models::subject::subject_by_code;
use crate::services::assessment_store::AssessmentStore;
use crate::utils::time::{export_stamp, now};
use crate::utils::validation::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Zero-based position in the import file.
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub created: usize,
    pub total: usize,
    pub failure: Option<ImportFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.created == self.total
    }
}

/// Admin-side question bank and publishing workflow. Configuration
/// problems are reported before any request goes out; remote failures are
/// passed through untouched and local state is only refreshed from the
/// store after a successful call.
#[derive(Clone)]
pub struct AuthoringService<S: AssessmentStore> {
    store: S,
}

impl<S: AssessmentStore> AuthoringService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, questions), fields(question_count = questions.len()))]
    pub async fn publish(
        &self,
        assessment_id: &str,
        subject_code: &str,
        questions: &[Question],
    ) -> Result<Assessment> {
        require_assessment(assessment_id)?;
        if subject_code.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "Choose a subject before publishing".to_string(),
            ));
        }
        let subject = subject_by_code(subject_code).ok_or_else(|| {
            Error::InvalidConfiguration(format!("Unknown subject code {}", subject_code.trim()))
        })?;
        if questions.is_empty() {
            return Err(Error::InvalidConfiguration(
                "Add at least one question before publishing".to_string(),
            ));
        }

        let patch = AssessmentPatch {
            is_published: Some(true),
            subject_code: Some(subject.code.to_string()),
            subject_name: Some(subject.name.to_string()),
            ..Default::default()
        };
        let assessment = self.store.update_assessment(assessment_id, patch).await?;
        info!(assessment_id, subject = subject.code, "Assessment published");
        Ok(assessment)
    }

    pub async fn unpublish(&self, assessment_id: &str) -> Result<Assessment> {
        require_assessment(assessment_id)?;
        let patch = AssessmentPatch {
            is_published: Some(false),
            ..Default::default()
        };
        self.store.update_assessment(assessment_id, patch).await
    }

    pub async fn update_settings(
        &self,
        assessment_id: &str,
        time_limit_minutes: Option<i64>,
        max_attempts: Option<i64>,
    ) -> Result<Assessment> {
        require_assessment(assessment_id)?;
        let patch = AssessmentPatch {
            time_limit_minutes,
            max_attempts,
            ..Default::default()
        };
        validate(&patch)?;
        if patch == AssessmentPatch::default() {
            return Err(Error::BadRequest("Nothing to update".to_string()));
        }
        self.store.update_assessment(assessment_id, patch).await
    }

    pub async fn add_question(
        &self,
        assessment_id: &str,
        question: NewQuestion,
    ) -> Result<Vec<Question>> {
        require_assessment(assessment_id)?;
        validate(&question)?;
        self.store.create_question(assessment_id, question).await?;
        self.store.list_questions(assessment_id).await
    }

    pub async fn edit_question(
        &self,
        assessment_id: &str,
        question_index: usize,
        patch: QuestionPatch,
    ) -> Result<Vec<Question>> {
        require_assessment(assessment_id)?;
        validate(&patch)?;
        if patch.is_empty() {
            return Err(Error::BadRequest("Nothing to update".to_string()));
        }
        self.store
            .update_question(assessment_id, question_index, patch)
            .await?;
        self.store.list_questions(assessment_id).await
    }

    pub async fn remove_question(
        &self,
        assessment_id: &str,
        question_index: usize,
    ) -> Result<Vec<Question>> {
        require_assessment(assessment_id)?;
        self.store
            .delete_question(assessment_id, question_index)
            .await?;
        self.store.list_questions(assessment_id).await
    }

    /// Parses and converts every element before the first request, so a
    /// file that is not an array of questions creates nothing. Creation
    /// then runs in file order and stops at the first remote failure;
    /// questions already created stay in place.
    #[instrument(skip(self, raw))]
    pub async fn import_questions(&self, assessment_id: &str, raw: &str) -> Result<ImportReport> {
        require_assessment(assessment_id)?;
        let questions = parse_import(raw)?;
        let total = questions.len();
        let mut report = ImportReport {
            created: 0,
            total,
            failure: None,
        };

        for (index, question) in questions.into_iter().enumerate() {
            match self.store.create_question(assessment_id, question).await {
                Ok(_) => report.created += 1,
                Err(e) => {
                    warn!(index, error = %e, "Question import stopped");
                    report.failure = Some(ImportFailure {
                        index,
                        message: e.user_message(),
                    });
                    break;
                }
            }
        }

        info!(created = report.created, total, "Question import finished");
        Ok(report)
    }

    pub async fn import_from_file(
        &self,
        assessment_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<ImportReport> {
        let raw = fs::read_to_string(path)?;
        self.import_questions(assessment_id, &raw).await
    }
}

fn require_assessment(assessment_id: &str) -> Result<()> {
    if assessment_id.trim().is_empty() {
        return Err(Error::InvalidConfiguration(
            "No assessment selected".to_string(),
        ));
    }
    Ok(())
}

pub fn parse_import(raw: &str) -> Result<Vec<NewQuestion>> {
    let value: JsonValue = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidImport(format!("not valid JSON: {}", e)))?;
    let items = match value {
        JsonValue::Array(items) => items,
        _ => {
            return Err(Error::InvalidImport(
                "expected a JSON array of questions".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<NewQuestion>(item).map_err(|e| {
                Error::InvalidImport(format!("question {} is malformed: {}", idx + 1, e))
            })
        })
        .collect()
}

pub fn export_questions(questions: &[Question]) -> Result<String> {
    let wire: Vec<WireQuestion> = questions.iter().cloned().map(WireQuestion::from).collect();
    Ok(serde_json::to_string_pretty(&wire)?)
}

pub fn export_to_file(questions: &[Question], path: impl AsRef<Path>) -> Result<()> {
    let body = export_questions(questions)?;
    fs::write(path.as_ref(), body)?;
    info!(path = %path.as_ref().display(), count = questions.len(), "Questions exported");
    Ok(())
}

pub fn export_file_name(assessment_id: &str) -> String {
    format!("questions-{}-{}.json", assessment_id, export_stamp(now()))
}
