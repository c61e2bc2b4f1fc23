//! Global catalog endpoints: device types, device statuses and operating systems.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CatalogEntry, CatalogKind, CatalogNameRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthSession;

fn parse_kind(slug: &str) -> Result<CatalogKind, ApiError> {
    slug.parse().map_err(ApiError::NotFound)
}

/// GET /api/v1/catalogs/:kind
pub async fn list_entries(
    State(state): State<AppState>,
    session: AuthSession,
    Path(kind): Path<String>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.services.catalogs.list(&session, kind).await?))
}

/// POST /api/v1/catalogs/:kind
///
/// Names that differ only by case or accents are the same entry (409).
pub async fn create_entry(
    State(state): State<AppState>,
    session: AuthSession,
    Path(kind): Path<String>,
    Json(request): Json<CatalogNameRequest>,
) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
    let kind = parse_kind(&kind)?;
    let entry = state.services.catalogs.create(&session, kind, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/catalogs/:kind/:id
pub async fn rename_entry(
    State(state): State<AppState>,
    session: AuthSession,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<CatalogNameRequest>,
) -> Result<Json<CatalogEntry>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(
        state.services.catalogs.rename(&session, kind, id, request).await?,
    ))
}

/// DELETE /api/v1/catalogs/:kind/:id
///
/// Refused while any device references the entry.
pub async fn delete_entry(
    State(state): State<AppState>,
    session: AuthSession,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    state.services.catalogs.delete(&session, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("device-types").unwrap(), CatalogKind::DeviceType);
        assert_eq!(
            parse_kind("operating-systems").unwrap(),
            CatalogKind::OperatingSystem
        );
        assert!(matches!(parse_kind("vendors"), Err(ApiError::NotFound(_))));
    }
}
