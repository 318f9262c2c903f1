use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AssessmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    pub time_limit_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "At least one attempt must be allowed"))]
    pub max_attempts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewAssessment {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub exercise_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    pub time_limit_minutes: Option<i64>,
    #[validate(range(min = 1, message = "At least one attempt must be allowed"))]
    pub max_attempts: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: f64,
}

impl NewAssessment {
    pub fn quiz(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            exercise_type: "quiz".to_string(),
            time_limit_minutes: None,
            max_attempts: 1,
            passing_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentFilter {
    pub subject_code: Option<String>,
    pub published_only: bool,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl AssessmentFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(code) = self.subject_code.as_ref().filter(|c| !c.trim().is_empty()) {
            pairs.push(("subject_code", code.trim().to_string()));
        }
        if self.published_only {
            pairs.push(("published_only", "true".to_string()));
        }
        pairs
    }
}
