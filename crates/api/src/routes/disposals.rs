//! Disposal record endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateDisposalRequest, Disposal, Page, UpdateDisposalRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthSession, PageQuery};

/// GET /api/v1/disposals
pub async fn list_disposals(
    State(state): State<AppState>,
    session: AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Disposal>>, ApiError> {
    Ok(Json(state.services.disposals.list(&session, page.into()).await?))
}

/// GET /api/v1/disposals/:id
pub async fn get_disposal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Disposal>, ApiError> {
    Ok(Json(state.services.disposals.get(&session, id).await?))
}

/// Record a disposal. The device is moved to the disposed status in the same
/// operation and its disposal fields are filled from the record.
///
/// POST /api/v1/disposals
pub async fn create_disposal(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateDisposalRequest>,
) -> Result<(StatusCode, Json<Disposal>), ApiError> {
    let disposal = state.services.disposals.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(disposal)))
}

/// PUT /api/v1/disposals/:id
pub async fn update_disposal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDisposalRequest>,
) -> Result<Json<Disposal>, ApiError> {
    Ok(Json(state.services.disposals.update(&session, id, request).await?))
}

/// Hard delete of the record only; the device keeps its status.
///
/// DELETE /api/v1/disposals/:id
pub async fn delete_disposal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.disposals.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
