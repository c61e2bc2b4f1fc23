//! Actions and resource kinds understood by the access policy and the audit trail.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Import,
    Export,
}

impl Action {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Read | Action::Export)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Import => "import",
            Action::Export => "export",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tenant,
    Principal,
    Department,
    Area,
    StaffUser,
    Device,
    Maintenance,
    Disposal,
    Catalog,
    AuditLog,
}

impl ResourceKind {
    /// Records of these kinds carry a `tenant_id` and are filtered by scope.
    pub fn is_tenant_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::Department
                | ResourceKind::Area
                | ResourceKind::StaffUser
                | ResourceKind::Device
                | ResourceKind::Maintenance
                | ResourceKind::Disposal
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tenant => "tenant",
            ResourceKind::Principal => "principal",
            ResourceKind::Department => "department",
            ResourceKind::Area => "area",
            ResourceKind::StaffUser => "staff_user",
            ResourceKind::Device => "device",
            ResourceKind::Maintenance => "maintenance",
            ResourceKind::Disposal => "disposal",
            ResourceKind::Catalog => "catalog",
            ResourceKind::AuditLog => "audit_log",
        }
    }

    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Tenant,
            ResourceKind::Principal,
            ResourceKind::Department,
            ResourceKind::Area,
            ResourceKind::StaffUser,
            ResourceKind::Device,
            ResourceKind::Maintenance,
            ResourceKind::Disposal,
            ResourceKind::Catalog,
            ResourceKind::AuditLog,
        ]
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
