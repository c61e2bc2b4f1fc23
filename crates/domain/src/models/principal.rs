//! System login principals and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::RecordState;
use super::nullable;
use crate::error::{DomainError, DomainResult};

/// Closed set of principal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every hotel, including destructive tenant operations
    GlobalRoot,
    /// Read-only access to every hotel
    GlobalViewer,
    /// Manages the hotels it is assigned to
    TenantAdmin,
    /// Creates and edits records in its hotels, cannot delete
    TenantAssistant,
    /// Read-only access to its hotels
    TenantGuest,
}

impl Role {
    /// Global roles see every tenant and carry no tenant assignments.
    pub fn is_global(&self) -> bool {
        matches!(self, Role::GlobalRoot | Role::GlobalViewer)
    }

    /// Higher value = more privileges.
    pub fn priority(&self) -> u8 {
        match self {
            Role::GlobalRoot => 100,
            Role::TenantAdmin => 80,
            Role::TenantAssistant => 60,
            Role::GlobalViewer => 40,
            Role::TenantGuest => 20,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::GlobalRoot => "Full access to all hotels",
            Role::GlobalViewer => "Read-only access to all hotels",
            Role::TenantAdmin => "Manages assigned hotels",
            Role::TenantAssistant => "Creates and edits records in assigned hotels",
            Role::TenantGuest => "Read-only access to assigned hotels",
        }
    }

    pub fn all() -> &'static [Role] {
        &[
            Role::GlobalRoot,
            Role::GlobalViewer,
            Role::TenantAdmin,
            Role::TenantAssistant,
            Role::TenantGuest,
        ]
    }

    /// Global roles must have zero tenants, every other role at least one.
    pub fn check_tenant_assignment(&self, tenant_ids: &[Uuid]) -> DomainResult<()> {
        match (self.is_global(), tenant_ids.is_empty()) {
            (true, false) => Err(DomainError::business_rule(format!(
                "role {} cannot be assigned to hotels",
                self
            ))),
            (false, true) => Err(DomainError::business_rule(format!(
                "role {} requires at least one hotel",
                self
            ))),
            _ => Ok(()),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "global_root" | "root" => Ok(Role::GlobalRoot),
            "global_viewer" => Ok(Role::GlobalViewer),
            "tenant_admin" => Ok(Role::TenantAdmin),
            "tenant_assistant" => Ok(Role::TenantAssistant),
            "tenant_guest" => Ok(Role::TenantGuest),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::GlobalRoot => write!(f, "global_root"),
            Role::GlobalViewer => write!(f, "global_viewer"),
            Role::TenantAdmin => write!(f, "tenant_admin"),
            Role::TenantAssistant => write!(f, "tenant_assistant"),
            Role::TenantGuest => write!(f, "tenant_guest"),
        }
    }
}

/// A system login identity. Credentials are held separately in [`PrincipalCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub tenant_ids: Vec<Uuid>,
    /// Bootstrap super-administrator: cannot be deleted or have its role changed.
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

impl Principal {
    pub fn is_member_of(&self, tenant_id: Uuid) -> bool {
        self.tenant_ids.contains(&tenant_id)
    }
}

#[derive(Debug, Clone)]
pub struct PrincipalCredentials {
    pub principal: Principal,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrincipalRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,

    pub role: Role,

    #[serde(default)]
    pub tenant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrincipalRequest {
    /// `null` clears the address.
    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<Option<String>>,

    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: Option<String>,

    pub role: Option<Role>,

    pub tenant_ids: Option<Vec<Uuid>>,
}

impl UpdatePrincipalRequest {
    /// True when the request would move the principal to a different role.
    pub fn changes_role_of(&self, principal: &Principal) -> bool {
        matches!(self.role, Some(role) if role != principal.role)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub principal: Principal,
}

/// Deduplicates tenant ids while keeping the first-seen order.
pub fn dedup_tenants(tenant_ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(tenant_ids.len());
    for id in tenant_ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
