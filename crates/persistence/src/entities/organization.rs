use chrono::{DateTime, Utc};
use domain::models::{Area, AreaWithDepartment, Department, RecordState};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEPARTMENT_COLUMNS: &str = "id, tenant_id, name, created_at, updated_at, deleted_at";
pub const AREA_COLUMNS: &str =
    "id, tenant_id, department_id, name, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AreaRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<AreaRow> for Area {
    fn from(row: AreaRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            department_id: row.department_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AreaWithDepartmentRow {
    #[sqlx(flatten)]
    pub area: AreaRow,
    pub department_name: String,
}

impl From<AreaWithDepartmentRow> for AreaWithDepartment {
    fn from(row: AreaWithDepartmentRow) -> Self {
        Self {
            area: row.area.into(),
            department_name: row.department_name,
        }
    }
}
