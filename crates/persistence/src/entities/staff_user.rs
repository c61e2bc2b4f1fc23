use chrono::{DateTime, Utc};
use domain::models::{RecordState, StaffUser};
use sqlx::FromRow;
use uuid::Uuid;

pub const STAFF_USER_COLUMNS: &str = "id, tenant_id, full_name, login, email, position, \
     department_id, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct StaffUserRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub full_name: String,
    pub login: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<StaffUserRow> for StaffUser {
    fn from(row: StaffUserRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            full_name: row.full_name,
            login: row.login,
            email: row.email,
            position: row.position,
            department_id: row.department_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        }
    }
}
