//! Bearer-token session extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Session;
use domain::DomainError;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header selecting the active hotel for the request.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The caller's session: a validated access token resolved to a live principal,
/// plus the hotel chosen through `X-Tenant-Id`.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl std::ops::Deref for AuthSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

fn requested_tenant(parts: &Parts) -> Result<Option<Uuid>, ApiError> {
    match parts.headers.get(TENANT_HEADER) {
        None => Ok(None),
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ApiError::validation("X-Tenant-Id must be a UUID"))?
                .trim();
            if raw.is_empty() {
                return Ok(None);
            }
            Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| ApiError::validation("X-Tenant-Id must be a UUID"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)?;

        let principal_id = state
            .jwt
            .validate_token(token)
            .and_then(|claims| shared::jwt::extract_principal_id(&claims))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })?;

        let tenant = requested_tenant(parts)?;

        match state.services.principals.establish_session(principal_id, tenant).await {
            Ok(session) => Ok(AuthSession(session)),
            // Token outlived its principal
            Err(DomainError::NotFound(_)) => Err(ApiError::Unauthorized(
                "Account is no longer active".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/devices");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(
            bearer_token(&parts(&[("Authorization", "Bearer abc.def")])).unwrap(),
            "abc.def"
        );
        assert!(bearer_token(&parts(&[])).is_err());
        assert!(bearer_token(&parts(&[("Authorization", "Basic dXNlcg==")])).is_err());
        assert!(bearer_token(&parts(&[("Authorization", "Bearer ")])).is_err());
    }

    #[test]
    fn test_requested_tenant() {
        let id = Uuid::new_v4();
        assert_eq!(
            requested_tenant(&parts(&[("X-Tenant-Id", &id.to_string())])).unwrap(),
            Some(id)
        );
        assert_eq!(requested_tenant(&parts(&[])).unwrap(), None);
        assert_eq!(requested_tenant(&parts(&[("X-Tenant-Id", " ")])).unwrap(), None);
        assert!(matches!(
            requested_tenant(&parts(&[("X-Tenant-Id", "hotel-1")])),
            Err(ApiError::Validation(..))
        ));
    }
}
