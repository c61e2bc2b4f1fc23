//! Login endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{LoginRequest, LoginResponse};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Exchanges credentials for a bearer access token.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    if let Err(retry_after) = state.login_limiter.check(&request.username) {
        tracing::warn!(username = %request.username.trim(), retry_after, "Login throttled");
        return Ok(state.login_limiter.rejection(retry_after));
    }

    let principal = state
        .services
        .principals
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let (access_token, _jti) = state
        .jwt
        .generate_access_token(principal.id)
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_token_expiry_secs,
        principal,
    })
    .into_response())
}
