use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Validation failed ({rule}): {message}")]
    Validation { rule: String, message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal error")]
    Internal,
}

impl MatchingError {
    pub fn validation(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for MatchingError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { rule, message } => Self::Validation {
                rule: rule.to_string(),
                message,
            },
            InvalidOperation { message } => Self::InvalidOperation { message },
            InvalidState { message } => Self::InvalidState { message },
            ProfileNotFound { identity } => Self::NotFound {
                message: format!("profile '{identity}'"),
            },
            SessionNotFound { id } => Self::NotFound {
                message: format!("session {id}"),
            },
            Storage { .. } => Self::internal(),
        }
    }
}
