//! Area repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Area, AreaWithDepartment, Page};
use domain::services::scope::TenantScope;
use domain::store::AreaStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::organization::AREA_COLUMNS;
use crate::entities::{AreaRow, AreaWithDepartmentRow};
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct AreaRepository {
    pool: PgPool,
}

impl AreaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AreaStore for AreaRepository {
    async fn insert(&self, area: &Area) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO areas (id, tenant_id, department_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(area.id)
        .bind(area.tenant_id)
        .bind(area.department_id)
        .bind(&area.name)
        .bind(area.created_at)
        .bind(area.updated_at)
        .execute(&self.pool)
        .await;
        result.into_domain().map(|_| ())
    }

    async fn update(&self, scope: &TenantScope, area: &Area) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE areas SET department_id = $2, name = $3, updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
              AND ($5::uuid[] IS NULL OR tenant_id = ANY($5))
            "#,
        )
        .bind(area.id)
        .bind(area.department_id)
        .bind(&area.name)
        .bind(area.updated_at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Area")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let timer = QueryTimer::new("area_soft_delete");
        let mut tx = self.pool.begin().await.into_domain()?;

        let locked: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM areas
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
            return Err(DomainError::not_found("Area"));
        }

        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM devices WHERE area_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;
        if in_use {
            return Err(DomainError::DependencyInUse("area still has devices".into()));
        }

        sqlx::query("UPDATE areas SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .into_domain()?;
        tx.commit().await.into_domain()?;
        timer.record();
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Area>> {
        let row = sqlx::query_as::<_, AreaRow>(&format!(
            r#"
            SELECT {AREA_COLUMNS} FROM areas
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Area::from))
    }

    async fn list(
        &self,
        scope: &TenantScope,
        department_id: Option<Uuid>,
        page: PageRequest,
    ) -> DomainResult<Page<Area>> {
        let timer = QueryTimer::new("area_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM areas
            WHERE deleted_at IS NULL
              AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
              AND ($2::uuid IS NULL OR department_id = $2)
            "#,
        )
        .bind(&ids)
        .bind(department_id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, AreaRow>(&format!(
            r#"
            SELECT {AREA_COLUMNS} FROM areas
            WHERE deleted_at IS NULL
              AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
              AND ($2::uuid IS NULL OR department_id = $2)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&ids)
        .bind(department_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await
        .into_domain()?;

        tx.commit().await.into_domain()?;
        timer.record();
        Ok(Page::new(rows.into_iter().map(Area::from).collect(), total, page))
    }

    async fn list_with_departments(&self, tenant_id: Uuid) -> DomainResult<Vec<AreaWithDepartment>> {
        let rows = sqlx::query_as::<_, AreaWithDepartmentRow>(
            r#"
            SELECT a.id, a.tenant_id, a.department_id, a.name, a.created_at, a.updated_at,
                   a.deleted_at, d.name AS department_name
            FROM areas a
            JOIN departments d ON d.id = a.department_id AND d.deleted_at IS NULL
            WHERE a.tenant_id = $1 AND a.deleted_at IS NULL
            ORDER BY d.name, a.name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .into_domain()?;
        Ok(rows.into_iter().map(AreaWithDepartment::from).collect())
    }
}
