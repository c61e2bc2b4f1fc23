use chrono::{DateTime, NaiveDate, Utc};
use domain::error::DomainError;
use domain::models::{Maintenance, MaintenanceKind, MaintenanceReminder, MaintenanceStatus, RecordState};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::parse_column;

pub const MAINTENANCE_COLUMNS: &str = "id, tenant_id, device_id, description, kind, status, \
     scheduled_date, completed_date, technician, reminded_at, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub description: String,
    pub kind: String,
    pub status: String,
    pub scheduled_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub technician: Option<String>,
    pub reminded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<MaintenanceRow> for Maintenance {
    type Error = DomainError;

    fn try_from(row: MaintenanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            device_id: row.device_id,
            description: row.description,
            kind: parse_column::<MaintenanceKind>("kind", &row.kind)?,
            status: parse_column::<MaintenanceStatus>("status", &row.status)?,
            scheduled_date: row.scheduled_date,
            completed_date: row.completed_date,
            technician: row.technician,
            reminded_at: row.reminded_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceReminderRow {
    #[sqlx(flatten)]
    pub maintenance: MaintenanceRow,
    pub device_name: String,
    pub tenant_name: String,
}

impl TryFrom<MaintenanceReminderRow> for MaintenanceReminder {
    type Error = DomainError;

    fn try_from(row: MaintenanceReminderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            maintenance: row.maintenance.try_into()?,
            device_name: row.device_name,
            tenant_name: row.tenant_name,
        })
    }
}
