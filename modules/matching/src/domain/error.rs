use thiserror::Error;
use uuid::Uuid;

/// Failing validation rules, reported verbatim as the problem `code`.
pub mod rule {
    pub const NAME_REQUIRED: &str = "name_required";
    pub const BIRTHDAY_REQUIRED: &str = "birthday_required";
    pub const GENDER_REQUIRED: &str = "gender_required";
    pub const TIMEZONE_REQUIRED: &str = "timezone_required";
    pub const PHOTO_COUNT: &str = "photo_count";
    pub const PHOTO_URL: &str = "photo_url";
    pub const PHOTO_EMPTY: &str = "photo_empty";
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed ({rule}): {message}")]
    Validation { rule: &'static str, message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Profile not found: {identity}")]
    ProfileNotFound { identity: String },

    #[error("Session not found: {id}")]
    SessionNotFound { id: Uuid },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(rule: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            rule,
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn profile_not_found(identity: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            identity: identity.into(),
        }
    }

    pub fn session_not_found(id: Uuid) -> Self {
        Self::SessionNotFound { id }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Rule code for validation failures.
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            Self::Validation { rule, .. } => Some(rule),
            _ => None,
        }
    }
}
