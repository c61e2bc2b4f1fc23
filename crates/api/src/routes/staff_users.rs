//! Hotel staff directory endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateStaffUserRequest, Page, StaffUser, UpdateStaffUserRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthSession, PageQuery};

pub async fn list_staff_users(
    State(state): State<AppState>,
    session: AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<StaffUser>>, ApiError> {
    Ok(Json(state.services.staff.list(&session, page.into()).await?))
}

pub async fn get_staff_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffUser>, ApiError> {
    Ok(Json(state.services.staff.get(&session, id).await?))
}

pub async fn create_staff_user(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<CreateStaffUserRequest>,
) -> Result<(StatusCode, Json<StaffUser>), ApiError> {
    let staff_user = state.services.staff.create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(staff_user)))
}

pub async fn update_staff_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStaffUserRequest>,
) -> Result<Json<StaffUser>, ApiError> {
    Ok(Json(state.services.staff.update(&session, id, request).await?))
}

pub async fn delete_staff_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.staff.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
