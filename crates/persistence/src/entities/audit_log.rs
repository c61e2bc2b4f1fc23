use chrono::{DateTime, Utc};
use domain::error::DomainError;
use domain::models::{AuditAction, AuditLog, ResourceKind};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::parse_column;

pub const AUDIT_LOG_COLUMNS: &str = "id, action, entity_kind, entity_id, before, after, \
     principal_id, tenant_id, detail, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    pub id: Uuid,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub principal_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLog {
    type Error = DomainError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            action: parse_column::<AuditAction>("action", &row.action)?,
            entity_kind: parse_column::<ResourceKind>("entity_kind", &row.entity_kind)?,
            entity_id: row.entity_id,
            before: row.before,
            after: row.after,
            principal_id: row.principal_id,
            tenant_id: row.tenant_id,
            detail: row.detail,
            created_at: row.created_at,
        })
    }
}
