//! Staff users: hotel employees that devices are assigned to.
//!
//! Staff users are organizational records, not logins; see [`super::principal`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::{RecordState, TenantOwned};
use super::nullable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub full_name: String,
    /// Network or mail login, unique per tenant when present.
    pub login: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

impl TenantOwned for StaffUser {
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
pub struct CreateStaffUserRequest {
    pub tenant_id: Option<Uuid>,

    #[validate(length(min = 1, max = 160, message = "fullName must be 1-160 characters"))]
    pub full_name: String,

    #[validate(length(min = 1, max = 64, message = "login must be 1-64 characters"))]
    pub login: Option<String>,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    #[validate(length(max = 120, message = "position must be at most 120 characters"))]
    pub position: Option<String>,

    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffUserRequest {
    #[validate(length(min = 1, max = 160, message = "fullName must be 1-160 characters"))]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub login: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub email: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub position: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub department_id: Option<Option<Uuid>>,
}

impl StaffUser {
    pub fn new(tenant_id: Uuid, request: CreateStaffUserRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            full_name: request.full_name.trim().to_string(),
            login: request.login.map(|l| l.trim().to_string()),
            email: request.email,
            position: request.position,
            department_id: request.department_id,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }

    pub fn apply(&mut self, request: UpdateStaffUserRequest, now: DateTime<Utc>) {
        if let Some(full_name) = request.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(login) = request.login {
            self.login = login.map(|l| l.trim().to_string());
        }
        if let Some(email) = request.email {
            self.email = email;
        }
        if let Some(position) = request.position {
            self.position = position;
        }
        if let Some(department_id) = request.department_id {
            self.department_id = department_id;
        }
        self.updated_at = now;
    }
}
