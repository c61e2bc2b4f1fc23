//! Principal (login account) repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Page, Principal, PrincipalCredentials, Role};
use domain::services::scope::TenantScope;
use domain::store::PrincipalStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::principal::PRINCIPAL_COLUMNS;
use crate::entities::{PrincipalCredentialsRow, PrincipalRow};
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PrincipalRepository {
    async fn insert(&self, principal: &Principal, password_hash: &str) -> DomainResult<()> {
        let timer = QueryTimer::new("principal_insert");
        let result = sqlx::query(
            r#"
            INSERT INTO principals
                (id, username, email, password_hash, role, tenant_ids, protected, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(principal.id)
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(password_hash)
        .bind(principal.role.to_string())
        .bind(&principal.tenant_ids)
        .bind(principal.protected)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.into_domain().map(|_| ())
    }

    async fn update(&self, principal: &Principal, password_hash: Option<&str>) -> DomainResult<()> {
        let timer = QueryTimer::new("principal_update");
        let result = sqlx::query(
            r#"
            UPDATE principals
            SET email = $2,
                role = $3,
                tenant_ids = $4,
                password_hash = COALESCE($5, password_hash),
                updated_at = $6
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(principal.id)
        .bind(&principal.email)
        .bind(principal.role.to_string())
        .bind(&principal.tenant_ids)
        .bind(password_hash)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        expect_one(result.into_domain()?.rows_affected(), "Principal")
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE principals SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Principal")
    }

    async fn find(&self, id: Uuid) -> DomainResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        row.map(Principal::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE LOWER(username) = LOWER(TRIM($1))"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        row.map(Principal::try_from).transpose()
    }

    async fn find_credentials(&self, username: &str) -> DomainResult<Option<PrincipalCredentials>> {
        let timer = QueryTimer::new("principal_find_credentials");
        let row = sqlx::query_as::<_, PrincipalCredentialsRow>(&format!(
            r#"
            SELECT {PRINCIPAL_COLUMNS}, password_hash FROM principals
            WHERE LOWER(username) = LOWER(TRIM($1)) AND deleted_at IS NULL
            "#
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        timer.record();
        row.map(PrincipalCredentials::try_from).transpose()
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Principal>> {
        let timer = QueryTimer::new("principal_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM principals
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_ids && $1)
            "#,
        )
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, PrincipalRow>(&format!(
            r#"
            SELECT {PRINCIPAL_COLUMNS} FROM principals
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_ids && $1)
            ORDER BY username
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&ids)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await
        .into_domain()?;

        tx.commit().await.into_domain()?;
        timer.record();
        let principals = rows
            .into_iter()
            .map(Principal::try_from)
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Page::new(principals, total, page))
    }

    async fn list_notification_recipients(&self, tenant_id: Uuid) -> DomainResult<Vec<Principal>> {
        let rows = sqlx::query_as::<_, PrincipalRow>(&format!(
            r#"
            SELECT {PRINCIPAL_COLUMNS} FROM principals
            WHERE deleted_at IS NULL
              AND role = $1
              AND $2 = ANY(tenant_ids)
              AND email IS NOT NULL
            ORDER BY username
            "#
        ))
        .bind(Role::TenantAdmin.to_string())
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .into_domain()?;
        rows.into_iter().map(Principal::try_from).collect()
    }
}
