//! Device inventory endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateDeviceRequest, Device, DeviceFilter, Page, UpdateDeviceRequest};
use serde::Deserialize;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthSession;

/// Query parameters for the device list. Soft-deleted devices are never listed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListQuery {
    pub area_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    /// Matches name, tag or serial, case-insensitively.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl DeviceListQuery {
    fn split(self) -> (DeviceFilter, PageRequest) {
        (
            DeviceFilter {
                area_id: self.area_id,
                status_id: self.status_id,
                assigned_user_id: self.assigned_user_id,
                search: self.search.filter(|s| !s.trim().is_empty()),
            },
            PageRequest::new(self.page, self.per_page),
        )
    }
}

/// List devices visible to the caller.
///
/// GET /api/v1/devices?areaId=&statusId=&assignedUserId=&search=&page=&perPage=
pub async fn list_devices(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<Page<Device>>, ApiError> {
    let (filter, page) = query.split();
    Ok(Json(state.services.devices.list(&session, &filter, page).await?))
}

/// GET /api/v1/devices/:id
pub async fn get_device(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.services.devices.get(&session, id).await?))
}

/// Register a device.
///
/// Disposal fields are only accepted together with a disposed status, and a
/// disposed status without a disposal date gets today's date.
///
/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let device = state.services.devices.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Partially update a device. `null` clears a field, an absent key keeps it.
///
/// PUT /api/v1/devices/:id
pub async fn update_device(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.services.devices.update(&session, id, request).await?))
}

/// Soft delete. The serial stays reserved for the hotel.
///
/// DELETE /api/v1/devices/:id
pub async fn delete_device(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.devices.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
