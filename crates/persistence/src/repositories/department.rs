//! Department repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Department, Page};
use domain::services::scope::TenantScope;
use domain::store::DepartmentStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::organization::DEPARTMENT_COLUMNS;
use crate::entities::DepartmentRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
    async fn insert(&self, department: &Department) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO departments (id, tenant_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(department.id)
        .bind(department.tenant_id)
        .bind(&department.name)
        .bind(department.created_at)
        .bind(department.updated_at)
        .execute(&self.pool)
        .await;
        result.into_domain().map(|_| ())
    }

    async fn update(&self, scope: &TenantScope, department: &Department) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE departments SET name = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
              AND ($4::uuid[] IS NULL OR tenant_id = ANY($4))
            "#,
        )
        .bind(department.id)
        .bind(&department.name)
        .bind(department.updated_at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Department")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let timer = QueryTimer::new("department_soft_delete");
        let mut tx = self.pool.begin().await.into_domain()?;

        let locked: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM departments
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&mut *tx)
        .await
        .into_domain()?;
        if locked.is_none() {
            return Err(DomainError::not_found("Department"));
        }

        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM areas WHERE department_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;
        if in_use {
            return Err(DomainError::DependencyInUse("department still has areas".into()));
        }

        sqlx::query("UPDATE departments SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .into_domain()?;
        tx.commit().await.into_domain()?;
        timer.record();
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!(
            r#"
            SELECT {DEPARTMENT_COLUMNS} FROM departments
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Department::from))
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Department>> {
        let timer = QueryTimer::new("department_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM departments
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
            "#,
        )
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, DepartmentRow>(&format!(
            r#"
            SELECT {DEPARTMENT_COLUMNS} FROM departments
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
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
        Ok(Page::new(rows.into_iter().map(Department::from).collect(), total, page))
    }
}
