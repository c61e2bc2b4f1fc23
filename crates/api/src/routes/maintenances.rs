//! Maintenance schedule endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateMaintenanceRequest, Maintenance, MaintenanceFilter, MaintenanceStatus, Page,
    UpdateMaintenanceRequest,
};
use serde::Deserialize;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthSession;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceListQuery {
    pub device_id: Option<Uuid>,
    pub status: Option<MaintenanceStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Newest scheduled date first.
///
/// GET /api/v1/maintenances?deviceId=&status=
pub async fn list_maintenances(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<MaintenanceListQuery>,
) -> Result<Json<Page<Maintenance>>, ApiError> {
    let filter = MaintenanceFilter {
        device_id: query.device_id,
        status: query.status,
    };
    let page = PageRequest::new(query.page, query.per_page);
    Ok(Json(
        state.services.maintenances.list(&session, &filter, page).await?,
    ))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Maintenance>, ApiError> {
    Ok(Json(state.services.maintenances.get(&session, id).await?))
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<Maintenance>), ApiError> {
    let maintenance = state.services.maintenances.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(maintenance)))
}

pub async fn update_maintenance(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<Maintenance>, ApiError> {
    Ok(Json(
        state.services.maintenances.update(&session, id, request).await?,
    ))
}

pub async fn delete_maintenance(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.maintenances.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
