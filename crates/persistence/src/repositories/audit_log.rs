//! Append-only audit log repository.

use async_trait::async_trait;
use domain::error::{DomainError, DomainResult};
use domain::models::{AuditLog, AuditLogFilter, Page};
use domain::services::scope::TenantScope;
use domain::store::AuditLogStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;

use super::scope_ids;
use crate::db::snapshot;
use crate::entities::audit_log::AUDIT_LOG_COLUMNS;
use crate::entities::AuditLogRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

/// Builds the WHERE clause for a filter. `$1` is always the tenant scope;
/// optional conditions take the following positions in field order.
struct AuditLogFilterBuilder {
    conditions: Vec<String>,
    param_count: usize,
}

impl AuditLogFilterBuilder {
    fn build(filter: &AuditLogFilter) -> Self {
        let mut builder = Self {
            conditions: vec!["($1::uuid[] IS NULL OR tenant_id = ANY($1))".to_string()],
            param_count: 1,
        };
        builder.push_if(filter.action.is_some(), "action =");
        builder.push_if(filter.entity_kind.is_some(), "entity_kind =");
        builder.push_if(filter.entity_id.is_some(), "entity_id =");
        builder.push_if(filter.principal_id.is_some(), "principal_id =");
        builder.push_if(filter.from.is_some(), "created_at >=");
        builder.push_if(filter.to.is_some(), "created_at <=");
        builder
    }

    fn push_if(&mut self, present: bool, comparison: &str) {
        if present {
            self.param_count += 1;
            self.conditions
                .push(format!("{} ${}", comparison, self.param_count));
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> usize {
        self.param_count
    }
}

/// Binds the optional filter values in the order [`AuditLogFilterBuilder`] numbered them.
macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {{
        let mut q = $query;
        if let Some(action) = $filter.action {
            q = q.bind(action.as_str());
        }
        if let Some(kind) = $filter.entity_kind {
            q = q.bind(kind.as_str());
        }
        if let Some(entity_id) = $filter.entity_id {
            q = q.bind(entity_id);
        }
        if let Some(principal_id) = $filter.principal_id {
            q = q.bind(principal_id);
        }
        if let Some(from) = $filter.from {
            q = q.bind(from);
        }
        if let Some(to) = $filter.to {
            q = q.bind(to);
        }
        q
    }};
}

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for AuditLogRepository {
    async fn insert(&self, entry: &AuditLog) -> DomainResult<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO audit_logs ({AUDIT_LOG_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(entry.id)
        .bind(entry.action.as_str())
        .bind(entry.entity_kind.as_str())
        .bind(entry.entity_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(entry.principal_id)
        .bind(entry.tenant_id)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await;
        result.into_domain().map(|_| ())
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditLogFilter,
        page: PageRequest,
    ) -> DomainResult<Page<AuditLog>> {
        let timer = QueryTimer::new("audit_log_list");
        let ids = scope_ids(scope);
        let builder = AuditLogFilterBuilder::build(filter);
        let where_clause = builder.where_clause();
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs WHERE {}", where_clause);
        let count = sqlx::query_scalar::<_, i64>(&count_sql).bind(&ids);
        let total = bind_filter!(count, filter)
            .fetch_one(&mut *tx)
            .await
            .into_domain()?;

        let list_sql = format!(
            r#"
            SELECT {AUDIT_LOG_COLUMNS} FROM audit_logs
            WHERE {}
            ORDER BY created_at DESC, id
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            builder.param_count() + 1,
            builder.param_count() + 2
        );
        let list = sqlx::query_as::<_, AuditLogRow>(&list_sql).bind(&ids);
        let rows = bind_filter!(list, filter)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await
            .into_domain()?;

        tx.commit().await.into_domain()?;
        timer.record();
        let entries = rows
            .into_iter()
            .map(AuditLog::try_from)
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Page::new(entries, total, page))
    }
}
