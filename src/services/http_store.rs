use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::dto::assessment_dto::{AssessmentFilter, AssessmentPatch, NewAssessment};
use crate::dto::question_dto::{NewQuestion, QuestionPatch};
use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::question::{assign_question_ids, Question};
use crate::services::assessment_store::AssessmentStore;

const ASSESSMENTS_PATH: &str = "/api/v1/mongo/assessments";

#[derive(Clone)]
pub struct HttpAssessmentStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAssessmentStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, ASSESSMENTS_PATH, suffix)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        read_json(response).await
    }
}

/// Maps a response to `T`, turning non-success statuses into errors that
/// carry the server's `detail`/`error` message when it sent one.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = remote_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        warn!(status = status.as_u16(), %message, "Assessment store request failed");
        return Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Remote {
                status: status.as_u16(),
                message,
            },
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn remote_detail(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    match value.get("detail").or_else(|| value.get("error"))? {
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl AssessmentStore for HttpAssessmentStore {
    #[instrument(skip(self))]
    async fn list_assessments(&self, filter: AssessmentFilter) -> Result<Vec<Assessment>> {
        let request = self.client.get(self.url("")).query(&filter.query_pairs());
        let assessments: Vec<Assessment> = self.send(request).await?;
        info!(count = assessments.len(), "Fetched assessments");
        Ok(assessments)
    }

    #[instrument(skip(self))]
    async fn get_assessment(&self, assessment_id: &str) -> Result<Assessment> {
        let request = self.client.get(self.url(&format!("/{}", assessment_id)));
        let mut assessment: Assessment = self.send(request).await?;
        assessment.questions = assign_question_ids(std::mem::take(&mut assessment.questions));
        Ok(assessment)
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    async fn create_assessment(&self, payload: NewAssessment) -> Result<Assessment> {
        let request = self.client.post(self.url("")).json(&payload);
        let assessment: Assessment = self.send(request).await?;
        info!(assessment_id = %assessment.id, "Assessment created");
        Ok(assessment)
    }

    #[instrument(skip(self, patch))]
    async fn update_assessment(
        &self,
        assessment_id: &str,
        patch: AssessmentPatch,
    ) -> Result<Assessment> {
        let request = self
            .client
            .patch(self.url(&format!("/{}", assessment_id)))
            .json(&patch);
        let assessment: Assessment = self.send(request).await?;
        info!(
            assessment_id,
            is_published = assessment.is_published,
            "Assessment updated"
        );
        Ok(assessment)
    }

    #[instrument(skip(self))]
    async fn delete_assessment(&self, assessment_id: &str) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/{}", assessment_id)));
        let _: JsonValue = self.send(request).await?;
        info!(assessment_id, "Assessment deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_questions(&self, assessment_id: &str) -> Result<Vec<Question>> {
        let request = self
            .client
            .get(self.url(&format!("/{}/questions", assessment_id)));
        let questions: Vec<Question> = self.send(request).await?;
        info!(count = questions.len(), "Fetched questions");
        Ok(assign_question_ids(questions))
    }

    #[instrument(skip(self, payload))]
    async fn create_question(&self, assessment_id: &str, payload: NewQuestion) -> Result<Question> {
        let request = self
            .client
            .post(self.url(&format!("/{}/questions", assessment_id)))
            .json(&payload);
        self.send(request).await
    }

    #[instrument(skip(self, patch))]
    async fn update_question(
        &self,
        assessment_id: &str,
        question_index: usize,
        patch: QuestionPatch,
    ) -> Result<Question> {
        let request = self
            .client
            .patch(self.url(&format!(
                "/{}/questions/{}",
                assessment_id, question_index
            )))
            .json(&patch);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn delete_question(&self, assessment_id: &str, question_index: usize) -> Result<()> {
        let request = self.client.delete(self.url(&format!(
            "/{}/questions/{}",
            assessment_id, question_index
        )));
        let _: JsonValue = self.send(request).await?;
        Ok(())
    }
}
