//! Error taxonomy returned by every domain operation.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Entity absent, soft-deleted, or outside the caller's tenant scope.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dependency in use: {0}")]
    DependencyInUse(String),

    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str) -> Self {
        DomainError::NotFound(format!("{} not found", entity))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::ValidationFailed(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        DomainError::BusinessRuleViolation(message.into())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();
                errors.iter().map(move |e| match &e.message {
                    Some(message) if field == "__all__" => message.to_string(),
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            DomainError::ValidationFailed(errors.to_string())
        } else {
            DomainError::ValidationFailed(messages.join("; "))
        }
    }
}
