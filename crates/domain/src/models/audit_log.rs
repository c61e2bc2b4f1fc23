//! Audit trail models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use super::access::ResourceKind;

/// Audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    BulkImport,
    Login,
    LoginFailed,
    UnauthorizedAccess,
    Export,
}

impl AuditAction {
    /// Actions that are not about a single entity. They are recorded with a
    /// nil entity id instead of being dropped.
    pub fn is_entityless(&self) -> bool {
        matches!(
            self,
            AuditAction::BulkImport | AuditAction::LoginFailed | AuditAction::UnauthorizedAccess
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::BulkImport => "bulk_import",
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::UnauthorizedAccess => "unauthorized_access",
            AuditAction::Export => "export",
        }
    }

    pub fn all() -> &'static [AuditAction] {
        &[
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::BulkImport,
            AuditAction::Login,
            AuditAction::LoginFailed,
            AuditAction::UnauthorizedAccess,
            AuditAction::Export,
        ]
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::all()
            .iter()
            .find(|a| a.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown audit action: {}", s))
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub action: AuditAction,
    pub entity_kind: ResourceKind,
    pub entity_id: Uuid,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    pub principal_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing audit entries. Scope filtering is applied separately.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilter {
    pub action: Option<AuditAction>,
    pub entity_kind: Option<ResourceKind>,
    pub entity_id: Option<Uuid>,
    pub principal_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AuditLogFilter {
    pub fn matches(&self, entry: &AuditLog) -> bool {
        self.action.map_or(true, |a| entry.action == a)
            && self.entity_kind.map_or(true, |k| entry.entity_kind == k)
            && self.entity_id.map_or(true, |id| entry.entity_id == id)
            && self.principal_id.map_or(true, |id| entry.principal_id == Some(id))
            && self.from.map_or(true, |from| entry.created_at >= from)
            && self.to.map_or(true, |to| entry.created_at <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entityless_allow_list() {
        assert!(AuditAction::BulkImport.is_entityless());
        assert!(AuditAction::LoginFailed.is_entityless());
        assert!(AuditAction::UnauthorizedAccess.is_entityless());
        assert!(!AuditAction::Update.is_entityless());
        assert!(!AuditAction::Login.is_entityless());
    }

    #[test]
    fn test_action_roundtrip() {
        for action in AuditAction::all() {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), *action);
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::Value::String(action.to_string())
            );
        }
    }

    #[test]
    fn test_filter_matches() {
        let entry = AuditLog {
            id: Uuid::new_v4(),
            action: AuditAction::Delete,
            entity_kind: ResourceKind::Device,
            entity_id: Uuid::new_v4(),
            before: None,
            after: None,
            principal_id: None,
            tenant_id: None,
            detail: None,
            created_at: Utc::now(),
        };
        assert!(AuditLogFilter::default().matches(&entry));
        assert!(AuditLogFilter {
            action: Some(AuditAction::Delete),
            entity_kind: Some(ResourceKind::Device),
            ..Default::default()
        }
        .matches(&entry));
        assert!(!AuditLogFilter {
            principal_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .matches(&entry));
    }
}
