//! Audit trail endpoints.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::{AuditAction, AuditLog, AuditLogFilter, Page, ResourceKind};
use serde::Deserialize;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthSession;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub action: Option<AuditAction>,
    pub entity_kind: Option<ResourceKind>,
    pub entity_id: Option<Uuid>,
    pub principal_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AuditLogQuery {
    fn filter(&self) -> Result<AuditLogFilter, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(ApiError::validation("'to' must not be before 'from'"));
            }
        }
        Ok(AuditLogFilter {
            action: self.action,
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            principal_id: self.principal_id,
            from: self.from,
            to: self.to,
        })
    }
}

/// Newest entries first, restricted to the caller's hotels.
///
/// GET /api/v1/audit-logs?action=&entityKind=&entityId=&principalId=&from=&to=
pub async fn list_audit_logs(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Page<AuditLog>>, ApiError> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.per_page);
    Ok(Json(state.services.audit.list(&session, &filter, page).await?))
}

/// Same filters as the list, rendered as a CSV download.
///
/// GET /api/v1/audit-logs/export
pub async fn export_audit_logs(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let csv = state.services.audit.export_csv(&session, &filter).await?;
    let filename = format!(
        "attachment; filename=\"audit-log-{}.csv\"",
        Utc::now().format("%Y%m%d-%H%M%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
