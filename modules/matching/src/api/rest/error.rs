use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.hackmatch.dev/{code}"))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map a domain error to RFC 9457 Problem Details.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { rule, message } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            rule,
            "Validation failed",
            message.clone(),
            instance,
        ),
        DomainError::InvalidOperation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "invalid_operation",
            "Invalid operation",
            message.clone(),
            instance,
        ),
        DomainError::InvalidState { message } => from_parts(
            StatusCode::CONFLICT,
            "invalid_state",
            "Invalid state",
            message.clone(),
            instance,
        ),
        DomainError::ProfileNotFound { identity } => from_parts(
            StatusCode::NOT_FOUND,
            "profile_not_found",
            "Profile not found",
            format!("No profile for '{identity}'"),
            instance,
        ),
        DomainError::SessionNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "session_not_found",
            "Session not found",
            format!("Session {id} not found"),
            instance,
        ),
        DomainError::Storage { message } => {
            // Details stay in the log
            tracing::error!(error = %message, "Storage error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal Server Error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
