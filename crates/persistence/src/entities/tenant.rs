use chrono::{DateTime, Utc};
use domain::models::{RecordState, Tenant};
use sqlx::FromRow;
use uuid::Uuid;

pub const TENANT_COLUMNS: &str = "id, name, code, active, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        }
    }
}
