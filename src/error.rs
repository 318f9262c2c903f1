pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid assessment configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message shown to the operator. Every failure is terminal at the UI
    /// boundary, so this is the only rendering callers need.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(msg) | Error::InvalidConfiguration(msg) => msg.clone(),
            Error::BadRequest(msg) | Error::NotFound(msg) => msg.clone(),
            Error::Remote { message, .. } => message.clone(),
            Error::InvalidImport(msg) => format!("Invalid import file: {}", msg),
            Error::Validation(err) => err.to_string(),
            Error::Json(err) => format!("Malformed response: {}", err),
            Error::Reqwest(err) => format!("Could not reach the assessment service: {}", err),
            Error::Io(err) => err.to_string(),
            Error::Internal(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_surface_the_server_detail() {
        let err = Error::Remote {
            status: 422,
            message: "question_text is required".to_string(),
        };
        assert_eq!(err.user_message(), "question_text is required");
        assert_eq!(
            err.to_string(),
            "Remote store error (422): question_text is required"
        );
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let err = Error::Internal("counter lock poisoned".to_string());
        assert!(!err.user_message().contains("poisoned"));
    }
}
