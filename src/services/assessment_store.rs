use async_trait::async_trait;

use crate::dto::assessment_dto::{AssessmentFilter, AssessmentPatch, NewAssessment};
use crate::dto::question_dto::{NewQuestion, QuestionPatch};
use crate::error::Result;
use crate::models::assessment::Assessment;
use crate::models::question::Question;

/// Remote assessment store. Questions are addressed by their position in
/// the assessment's list. Implementations make a single request per call
/// and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn list_assessments(&self, filter: AssessmentFilter) -> Result<Vec<Assessment>>;

    async fn get_assessment(&self, assessment_id: &str) -> Result<Assessment>;

    async fn create_assessment(&self, payload: NewAssessment) -> Result<Assessment>;

    async fn update_assessment(
        &self,
        assessment_id: &str,
        patch: AssessmentPatch,
    ) -> Result<Assessment>;

    async fn delete_assessment(&self, assessment_id: &str) -> Result<()>;

    async fn list_questions(&self, assessment_id: &str) -> Result<Vec<Question>>;

    async fn create_question(&self, assessment_id: &str, payload: NewQuestion) -> Result<Question>;

    async fn update_question(
        &self,
        assessment_id: &str,
        question_index: usize,
        patch: QuestionPatch,
    ) -> Result<Question>;

    async fn delete_question(&self, assessment_id: &str, question_index: usize) -> Result<()>;
}
