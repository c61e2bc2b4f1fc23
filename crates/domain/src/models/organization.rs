//! Departments and areas: the per-hotel organizational hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::{RecordState, TenantOwned};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

/// An area always belongs to the same tenant as its department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

impl TenantOwned for Department {
    fn id(&self) -> Uuid {
        self.id
    }
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
    fn state(&self) -> RecordState {
        self.state
    }
}

impl TenantOwned for Area {
    fn id(&self) -> Uuid {
        self.id
    }
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
    fn state(&self) -> RecordState {
        self.state
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    /// Defaults to the single tenant in scope.
    pub tenant_id: Option<Uuid>,

    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaRequest {
    pub department_id: Uuid,

    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAreaRequest {
    pub department_id: Option<Uuid>,

    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: Option<String>,
}

/// Area joined with its department name, used for import lookups.
#[derive(Debug, Clone)]
pub struct AreaWithDepartment {
    pub area: Area,
    pub department_name: String,
}

impl Department {
    pub fn new(tenant_id: Uuid, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }
}

impl Area {
    pub fn new(department: &Department, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: department.tenant_id,
            department_id: department.id,
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }
}
