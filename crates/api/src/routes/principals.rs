//! Login account endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreatePrincipalRequest, Page, Principal, UpdatePrincipalRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthSession, PageQuery};

pub async fn list_principals(
    State(state): State<AppState>,
    session: AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Principal>>, ApiError> {
    Ok(Json(state.services.principals.list(&session, page.into()).await?))
}

pub async fn get_principal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Principal>, ApiError> {
    Ok(Json(state.services.principals.get(&session, id).await?))
}

pub async fn create_principal(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreatePrincipalRequest>,
) -> Result<(StatusCode, Json<Principal>), ApiError> {
    let principal = state.services.principals.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(principal)))
}

/// The protected super-administrator keeps its role and cannot be deleted.
pub async fn update_principal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePrincipalRequest>,
) -> Result<Json<Principal>, ApiError> {
    Ok(Json(state.services.principals.update(&session, id, request).await?))
}

pub async fn delete_principal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.principals.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
