//! Hotel repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Page, Tenant};
use domain::services::scope::TenantScope;
use domain::store::TenantStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::tenant::TENANT_COLUMNS;
use crate::entities::TenantRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn insert(&self, tenant: &Tenant) -> DomainResult<()> {
        let timer = QueryTimer::new("tenant_insert");
        let result = sqlx::query(
            r#"
            INSERT INTO tenants (id, name, code, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.code)
        .bind(tenant.active)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.into_domain().map(|_| ())
    }

    async fn update(&self, tenant: &Tenant) -> DomainResult<()> {
        let timer = QueryTimer::new("tenant_update");
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET name = $2, code = $3, active = $4, updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.code)
        .bind(tenant.active)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        expect_one(result.into_domain()?.rows_affected(), "Hotel")
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let timer = QueryTimer::new("tenant_soft_delete");
        let mut tx = self.pool.begin().await.into_domain()?;

        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM tenants WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .into_domain()?;
        if locked.is_none() {
            return Err(DomainError::not_found("Hotel"));
        }

        let (in_use,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (SELECT 1 FROM departments WHERE tenant_id = $1 AND deleted_at IS NULL)
                OR EXISTS (SELECT 1 FROM staff_users WHERE tenant_id = $1 AND deleted_at IS NULL)
                OR EXISTS (SELECT 1 FROM devices WHERE tenant_id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;
        if in_use {
            return Err(DomainError::DependencyInUse(
                "hotel still has departments, staff or devices".into(),
            ));
        }

        sqlx::query("UPDATE tenants SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .into_domain()?;
        tx.commit().await.into_domain()?;
        timer.record();
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            r#"
            SELECT {TENANT_COLUMNS} FROM tenants
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Tenant::from))
    }

    async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM tenants WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .into_domain()?;
        Ok(exists)
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Tenant>> {
        let timer = QueryTimer::new("tenant_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM tenants
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR id = ANY($1))
            "#,
        )
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, TenantRow>(&format!(
            r#"
            SELECT {TENANT_COLUMNS} FROM tenants
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name
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
        Ok(Page::new(rows.into_iter().map(Tenant::from).collect(), total, page))
    }
}
