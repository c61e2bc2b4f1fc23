use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<ValidationDetail>),

    #[error("Unprocessable: {0}")]
    BusinessRule(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into(), Vec::new())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg, details) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg,
                (!details.is_empty()).then_some(details),
            ),
            ApiError::BusinessRule(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "business_rule_violation",
                msg,
                None,
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::ValidationFailed(msg) => ApiError::validation(msg),
            DomainError::Conflict(msg) | DomainError::DependencyInUse(msg) => {
                ApiError::Conflict(msg)
            }
            DomainError::BusinessRuleViolation(msg) => ApiError::BusinessRule(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "invalid value".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::not_found("Device"), StatusCode::NOT_FOUND),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (DomainError::DependencyInUse("areas".into()), StatusCode::CONFLICT),
            (DomainError::business_rule("rule"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_error, status) in cases {
            let response = ApiError::from(domain_error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError::from(DomainError::Internal("connection refused".into())).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_domain_message_is_passed_through() {
        let response =
            ApiError::from(DomainError::Conflict("serial SN-1 already exists".into()))
                .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["message"], "serial SN-1 already exists");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_api_error_rate_limited() {
        let response = ApiError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Unauthorized("test".into()).to_string(),
            "Unauthorized: test"
        );
        assert_eq!(ApiError::validation("test").to_string(), "Validation error: test");
        assert_eq!(ApiError::RateLimited.to_string(), "Rate limited");
    }

    #[derive(Validate)]
    struct Login {
        #[validate(length(min = 1, message = "username is required"))]
        username: String,
        #[validate(length(min = 1, message = "password is required"))]
        password: String,
    }

    #[tokio::test]
    async fn test_validation_errors_carry_details() {
        let errors = Login {
            username: String::new(),
            password: String::new(),
        }
        .validate()
        .unwrap_err();

        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "2 validation errors");
        assert_eq!(body["details"][0]["field"], "password");
        assert_eq!(body["details"][1]["message"], "username is required");
    }
}
