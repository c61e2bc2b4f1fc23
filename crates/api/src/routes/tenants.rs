//! Hotel (tenant) endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateTenantRequest, Page, Tenant, UpdateTenantRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthSession, PageQuery};

/// GET /api/v1/tenants
pub async fn list_tenants(
    State(state): State<AppState>,
    session: AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Tenant>>, ApiError> {
    Ok(Json(state.services.tenants.list(&session, page.into()).await?))
}

/// GET /api/v1/tenants/:id
pub async fn get_tenant(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, ApiError> {
    Ok(Json(state.services.tenants.get(&session, id).await?))
}

/// POST /api/v1/tenants
///
/// Global root only.
pub async fn create_tenant(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    let tenant = state.services.tenants.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// PUT /api/v1/tenants/:id
pub async fn update_tenant(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    Ok(Json(state.services.tenants.update(&session, id, request).await?))
}

/// DELETE /api/v1/tenants/:id
///
/// Refused with 409 while the hotel still has departments, staff or devices.
pub async fn delete_tenant(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.tenants.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
