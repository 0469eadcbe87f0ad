// crates/greeter-core/src/error.rs

use thiserror::Error;

/// Reason a value failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("first name cannot be empty")]
    EmptyFirstName,

    #[error("last name cannot be empty")]
    EmptyLastName,

    #[error("age must be a positive number")]
    NonPositiveAge,

    /// Free-form rule violation for request types outside the domain model.
    #[error("{0}")]
    Rule(String),
}

/// Service-wide error types for the Greeter service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GreeterError {
    /// Malformed or invalid input. Never retried.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The greeting policy rejected the person.
    #[error("greeting not allowed for this person")]
    NotAllowed,

    /// A policy, create, or audit dependency failed.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// The caller cancelled the call.
    #[error("call cancelled")]
    Cancelled,

    /// The call's deadline elapsed before the work finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl GreeterError {
    /// Convenience constructor for dependency failures.
    pub fn dependency(reason: impl Into<String>) -> Self {
        GreeterError::Dependency(reason.into())
    }
}
