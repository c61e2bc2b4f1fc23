//! Department and area endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    Area, CreateAreaRequest, CreateDepartmentRequest, Department, Page, UpdateAreaRequest,
    UpdateDepartmentRequest,
};
use serde::Deserialize;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthSession, PageQuery};

/// GET /api/v1/departments
pub async fn list_departments(
    State(state): State<AppState>,
    session: AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Department>>, ApiError> {
    Ok(Json(state.services.departments.list(&session, page.into()).await?))
}

/// GET /api/v1/departments/:id
pub async fn get_department(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Department>, ApiError> {
    Ok(Json(state.services.departments.get(&session, id).await?))
}

/// POST /api/v1/departments
///
/// `tenantId` may be omitted when a single hotel is active.
pub async fn create_department(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    let department = state.services.departments.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// PUT /api/v1/departments/:id
pub async fn update_department(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDepartmentRequest>,
) -> Result<Json<Department>, ApiError> {
    Ok(Json(state.services.departments.update(&session, id, request).await?))
}

/// DELETE /api/v1/departments/:id
pub async fn delete_department(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.departments.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaListQuery {
    pub department_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /api/v1/areas?departmentId=
pub async fn list_areas(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<AreaListQuery>,
) -> Result<Json<Page<Area>>, ApiError> {
    let page = PageRequest::new(query.page, query.per_page);
    Ok(Json(
        state
            .services
            .areas
            .list(&session, query.department_id, page)
            .await?,
    ))
}

/// GET /api/v1/areas/:id
pub async fn get_area(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Area>, ApiError> {
    Ok(Json(state.services.areas.get(&session, id).await?))
}

/// POST /api/v1/areas
///
/// The area joins the hotel of its department.
pub async fn create_area(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateAreaRequest>,
) -> Result<(StatusCode, Json<Area>), ApiError> {
    let area = state.services.areas.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(area)))
}

/// PUT /api/v1/areas/:id
pub async fn update_area(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAreaRequest>,
) -> Result<Json<Area>, ApiError> {
    Ok(Json(state.services.areas.update(&session, id, request).await?))
}

/// DELETE /api/v1/areas/:id
pub async fn delete_area(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.areas.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
