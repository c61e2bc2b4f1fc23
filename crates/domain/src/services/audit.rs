//! Audit trail: best-effort recording plus scoped reads and CSV export.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use shared::pagination::PageRequest;
use std::sync::Arc;
use uuid::Uuid;

use super::access_policy::authorize;
use super::scope::{self, TenantScope};
use crate::error::DomainResult;
use crate::models::{Action, AuditAction, AuditLog, AuditLogFilter, Page, ResourceKind, Session};
use crate::store::AuditLogStore;

/// Upper bound on rows written by one CSV export.
pub const MAX_EXPORT_ROWS: usize = 10_000;

const EXPORT_PAGE_SIZE: u32 = 100;

/// One auditable event, built fluently by the service that performed it.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    action: AuditAction,
    entity_kind: ResourceKind,
    entity_id: Option<Uuid>,
    principal_id: Option<Uuid>,
    before: Option<JsonValue>,
    after: Option<JsonValue>,
    detail: Option<String>,
}

fn snapshot<T: Serialize>(value: &T) -> Option<JsonValue> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize audit snapshot");
            None
        }
    }
}

impl AuditEvent {
    pub fn new(action: AuditAction, entity_kind: ResourceKind) -> Self {
        Self {
            action,
            entity_kind,
            entity_id: None,
            principal_id: None,
            before: None,
            after: None,
            detail: None,
        }
    }

    pub fn created<T: Serialize>(entity_kind: ResourceKind, id: Uuid, after: &T) -> Self {
        Self::new(AuditAction::Create, entity_kind)
            .on(id)
            .with_after(after)
    }

    pub fn updated<T: Serialize>(entity_kind: ResourceKind, id: Uuid, before: &T, after: &T) -> Self {
        Self::new(AuditAction::Update, entity_kind)
            .on(id)
            .with_before(before)
            .with_after(after)
    }

    pub fn deleted<T: Serialize>(entity_kind: ResourceKind, id: Uuid, before: &T) -> Self {
        Self::new(AuditAction::Delete, entity_kind)
            .on(id)
            .with_before(before)
    }

    pub fn on(mut self, id: Uuid) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Acting principal when no session exists yet, e.g. at login.
    pub fn by(mut self, principal_id: Uuid) -> Self {
        self.principal_id = Some(principal_id);
        self
    }

    pub fn with_before<T: Serialize>(mut self, before: &T) -> Self {
        self.before = snapshot(before);
        self
    }

    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = snapshot(after);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn tenant_in(snapshot: Option<&JsonValue>) -> Option<Uuid> {
    snapshot
        .and_then(|s| s.get("tenantId"))
        .and_then(JsonValue::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Tenant an entry is attributed to: the active tenant, else the `tenantId`
/// of the after snapshot, else that of the before snapshot.
pub fn attribute_tenant(
    session: Option<&Session>,
    before: Option<&JsonValue>,
    after: Option<&JsonValue>,
) -> Option<Uuid> {
    session
        .and_then(Session::active_tenant)
        .or_else(|| tenant_in(after))
        .or_else(|| tenant_in(before))
}

/// Writes audit entries. Never fails the operation being audited.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditLogStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, event: AuditEvent, session: Option<&Session>) {
        let entity_id = match (event.entity_id, event.action.is_entityless()) {
            (Some(id), _) => id,
            (None, true) => Uuid::nil(),
            (None, false) => {
                tracing::warn!(
                    action = %event.action,
                    entity_kind = %event.entity_kind,
                    "Dropping audit entry without entity id"
                );
                return;
            }
        };

        let entry = AuditLog {
            id: Uuid::new_v4(),
            action: event.action,
            entity_kind: event.entity_kind,
            entity_id,
            tenant_id: attribute_tenant(session, event.before.as_ref(), event.after.as_ref()),
            principal_id: event.principal_id.or(session.map(Session::principal_id)),
            before: event.before,
            after: event.after,
            detail: event.detail,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.insert(&entry).await {
            tracing::error!(
                error = %e,
                action = %entry.action,
                entity_kind = %entry.entity_kind,
                entity_id = %entry.entity_id,
                "Failed to write audit entry"
            );
        }
    }
}

/// Read side of the audit trail.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditLogStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        session: &Session,
        filter: &AuditLogFilter,
        page: PageRequest,
    ) -> DomainResult<Page<AuditLog>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::AuditLog, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.store.list(&scope, filter, page).await
    }

    /// Renders the filtered entries as CSV with a UTF-8 BOM.
    pub async fn export_csv(&self, session: &Session, filter: &AuditLogFilter) -> DomainResult<String> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Export, ResourceKind::AuditLog, None)?;

        let mut entries = Vec::new();
        if scope != TenantScope::NoAccess {
            let mut page_number = 1;
            loop {
                let request = PageRequest::new(Some(page_number), Some(EXPORT_PAGE_SIZE));
                let page = self.store.list(&scope, filter, request).await?;
                let last = page.data.len() < EXPORT_PAGE_SIZE as usize
                    || page_number >= page.pagination.total_pages;
                entries.extend(page.data);
                if last || entries.len() >= MAX_EXPORT_ROWS {
                    break;
                }
                page_number += 1;
            }
            entries.truncate(MAX_EXPORT_ROWS);
        }

        tracing::info!(
            principal_id = %session.principal_id(),
            rows = entries.len(),
            "Exported audit log"
        );
        Ok(render_csv(&entries))
    }
}

fn render_csv(entries: &[AuditLog]) -> String {
    let mut csv = String::new();
    csv.push('\u{FEFF}');
    csv.push_str("id,created_at,action,entity_kind,entity_id,principal_id,tenant_id,detail,before,after\n");

    let json = |v: &Option<JsonValue>| v.as_ref().map(JsonValue::to_string).unwrap_or_default();
    let id = |v: Option<Uuid>| v.map(|u| u.to_string()).unwrap_or_default();

    for entry in entries {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            entry.id,
            entry.created_at.to_rfc3339(),
            entry.action,
            entry.entity_kind,
            entry.entity_id,
            id(entry.principal_id),
            id(entry.tenant_id),
            escape_csv(entry.detail.as_deref().unwrap_or("")),
            escape_csv(&json(&entry.before)),
            escape_csv(&json(&entry.after)),
        ));
    }
    csv
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::models::{Principal, RecordState, Role};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl AuditLogStore for BrokenStore {
        async fn insert(&self, _entry: &AuditLog) -> DomainResult<()> {
            Err(DomainError::Internal("disk full".into()))
        }

        async fn list(
            &self,
            _scope: &TenantScope,
            _filter: &AuditLogFilter,
            page: PageRequest,
        ) -> DomainResult<Page<AuditLog>> {
            Ok(Page::empty(page))
        }
    }

    fn session(role: Role, tenants: Vec<Uuid>, active: Option<Uuid>) -> Session {
        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            username: "auditor".into(),
            email: None,
            role,
            tenant_ids: tenants,
            protected: false,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        };
        Session::establish(principal, active, true).unwrap()
    }

    async fn all_entries(store: &Arc<MemoryStore>) -> Vec<AuditLog> {
        AuditLogStore::list(
            store.as_ref(),
            &TenantScope::Unrestricted,
            &AuditLogFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap()
        .data
    }

    #[test]
    fn test_tenant_attribution_precedence() {
        let active = Uuid::new_v4();
        let in_after = Uuid::new_v4();
        let in_before = Uuid::new_v4();
        let before = json!({ "tenantId": in_before });
        let after = json!({ "tenantId": in_after });

        let with_active = session(Role::TenantAdmin, vec![active], Some(active));
        let without = session(Role::GlobalRoot, vec![], None);

        assert_eq!(
            attribute_tenant(Some(&with_active), Some(&before), Some(&after)),
            Some(active)
        );
        assert_eq!(
            attribute_tenant(Some(&without), Some(&before), Some(&after)),
            Some(in_after)
        );
        assert_eq!(attribute_tenant(Some(&without), Some(&before), None), Some(in_before));
        assert_eq!(attribute_tenant(None, None, Some(&json!({"name": "x"}))), None);
    }

    #[tokio::test]
    async fn test_entityless_actions_use_nil_id() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AuditRecorder::new(store.clone());

        recorder
            .record(
                AuditEvent::new(AuditAction::LoginFailed, ResourceKind::Principal)
                    .with_detail("unknown user"),
                None,
            )
            .await;

        let entries = all_entries(&store).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, Uuid::nil());
        assert_eq!(entries[0].principal_id, None);
    }

    #[tokio::test]
    async fn test_missing_entity_id_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AuditRecorder::new(store.clone());

        recorder
            .record(AuditEvent::new(AuditAction::Update, ResourceKind::Device), None)
            .await;

        assert!(all_entries(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let recorder = AuditRecorder::new(Arc::new(BrokenStore));
        // Completes without panicking or returning an error
        recorder
            .record(
                AuditEvent::created(ResourceKind::Tenant, Uuid::new_v4(), &json!({})),
                None,
            )
            .await;
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_requires_capability() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AuditRecorder::new(store.clone());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for tenant in [a, b] {
            recorder
                .record(
                    AuditEvent::created(ResourceKind::Device, Uuid::new_v4(), &json!({ "tenantId": tenant })),
                    None,
                )
                .await;
        }

        let service = AuditService::new(store.clone());
        let admin = session(Role::TenantAdmin, vec![a], None);
        let page = service
            .list(&admin, &AuditLogFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].tenant_id, Some(a));

        let assistant = session(Role::TenantAssistant, vec![a], None);
        assert!(matches!(
            service
                .list(&assistant, &AuditLogFilter::default(), PageRequest::default())
                .await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let store = Arc::new(MemoryStore::new());
        let recorder = AuditRecorder::new(store.clone());
        recorder
            .record(
                AuditEvent::created(ResourceKind::Tenant, Uuid::new_v4(), &json!({ "name": "Hotel, Centro" }))
                    .with_detail("alta \"nueva\""),
                None,
            )
            .await;

        let root = session(Role::GlobalRoot, vec![], None);
        let csv = AuditService::new(store)
            .export_csv(&root, &AuditLogFilter::default())
            .await
            .unwrap();

        assert!(csv.starts_with('\u{FEFF}'));
        assert!(csv.contains("id,created_at,action"));
        assert!(csv.contains("\"alta \"\"nueva\"\"\""));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }
}
