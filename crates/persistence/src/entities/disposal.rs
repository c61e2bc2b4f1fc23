use chrono::{DateTime, NaiveDate, Utc};
use domain::models::Disposal;
use sqlx::FromRow;
use uuid::Uuid;

pub const DISPOSAL_COLUMNS: &str = "id, tenant_id, device_id, disposal_date, reason, \
     authorized_by, notes, recorded_by, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct DisposalRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub disposal_date: NaiveDate,
    pub reason: String,
    pub authorized_by: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DisposalRow> for Disposal {
    fn from(row: DisposalRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            device_id: row.device_id,
            disposal_date: row.disposal_date,
            reason: row.reason,
            authorized_by: row.authorized_by,
            notes: row.notes,
            recorded_by: row.recorded_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
