use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::utils::flexible::{deserialize_id_flexible, deserialize_int_lenient};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(alias = "_id", deserialize_with = "deserialize_id_flexible")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject_code: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_int_lenient")]
    pub time_limit_minutes: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_int_lenient")]
    pub max_attempts: Option<i64>,
    #[serde(default)]
    pub passing_score: f64,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Validated timing and attempt budget of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub time_limit_seconds: u32,
    pub max_attempts: u32,
}

impl Assessment {
    /// Non-positive or unparseable limits are configuration errors: a
    /// session never runs with a zero or unbounded timer.
    pub fn session_limits(&self) -> Result<SessionLimits> {
        let minutes = positive(self.time_limit_minutes).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "Assessment '{}' has no valid time limit",
                self.title
            ))
        })?;
        let max_attempts = positive(self.max_attempts).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "Assessment '{}' has no valid attempt limit",
                self.title
            ))
        })?;
        let time_limit_seconds = minutes.checked_mul(60).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "Assessment '{}' has an out-of-range time limit",
                self.title
            ))
        })?;

        Ok(SessionLimits {
            time_limit_seconds,
            max_attempts,
        })
    }

    pub fn subject_label(&self) -> String {
        match (&self.subject_code, &self.subject_name) {
            (Some(code), Some(name)) => format!("{} - {}", code, name),
            (Some(code), None) => code.clone(),
            _ => "Unassigned".to_string(),
        }
    }
}

fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}
