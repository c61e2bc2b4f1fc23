use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Device, RecordState};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEVICE_COLUMNS: &str = "id, tenant_id, tag, name, serial, brand, model, ip_address, \
     mac_address, type_id, status_id, os_id, area_id, assigned_user_id, warranty_start, \
     warranty_end, disposal_date, disposal_reason, disposal_notes, notes, created_at, \
     updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub tag: Option<String>,
    pub name: String,
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub type_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub os_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
    pub disposal_date: Option<DateTime<Utc>>,
    pub disposal_reason: Option<String>,
    pub disposal_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            tag: row.tag,
            name: row.name,
            serial: row.serial,
            brand: row.brand,
            model: row.model,
            ip_address: row.ip_address,
            mac_address: row.mac_address,
            type_id: row.type_id,
            status_id: row.status_id,
            os_id: row.os_id,
            area_id: row.area_id,
            assigned_user_id: row.assigned_user_id,
            warranty_start: row.warranty_start,
            warranty_end: row.warranty_end,
            disposal_date: row.disposal_date,
            disposal_reason: row.disposal_reason,
            disposal_notes: row.disposal_notes,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        }
    }
}
