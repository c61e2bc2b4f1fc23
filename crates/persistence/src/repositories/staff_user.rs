//! Staff (device assignee) repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::DomainResult;
use domain::models::{Page, StaffUser};
use domain::services::scope::TenantScope;
use domain::store::StaffUserStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::staff_user::STAFF_USER_COLUMNS;
use crate::entities::StaffUserRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct StaffUserRepository {
    pool: PgPool,
}

impl StaffUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffUserStore for StaffUserRepository {
    async fn insert(&self, staff: &StaffUser) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO staff_users
                (id, tenant_id, full_name, login, email, position, department_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(staff.id)
        .bind(staff.tenant_id)
        .bind(&staff.full_name)
        .bind(&staff.login)
        .bind(&staff.email)
        .bind(&staff.position)
        .bind(staff.department_id)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await;
        result.into_domain().map(|_| ())
    }

    async fn update(&self, scope: &TenantScope, staff: &StaffUser) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE staff_users
            SET full_name = $2, login = $3, email = $4, position = $5, department_id = $6,
                updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
              AND ($8::uuid[] IS NULL OR tenant_id = ANY($8))
            "#,
        )
        .bind(staff.id)
        .bind(&staff.full_name)
        .bind(&staff.login)
        .bind(&staff.email)
        .bind(&staff.position)
        .bind(staff.department_id)
        .bind(staff.updated_at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Staff user")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE staff_users SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
              AND ($3::uuid[] IS NULL OR tenant_id = ANY($3))
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Staff user")
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<StaffUser>> {
        let row = sqlx::query_as::<_, StaffUserRow>(&format!(
            r#"
            SELECT {STAFF_USER_COLUMNS} FROM staff_users
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(StaffUser::from))
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<StaffUser>> {
        let timer = QueryTimer::new("staff_user_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM staff_users
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
            "#,
        )
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, StaffUserRow>(&format!(
            r#"
            SELECT {STAFF_USER_COLUMNS} FROM staff_users
            WHERE deleted_at IS NULL AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
            ORDER BY full_name
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
        Ok(Page::new(rows.into_iter().map(StaffUser::from).collect(), total, page))
    }

    async fn list_all(&self, tenant_id: Uuid) -> DomainResult<Vec<StaffUser>> {
        let rows = sqlx::query_as::<_, StaffUserRow>(&format!(
            r#"
            SELECT {STAFF_USER_COLUMNS} FROM staff_users
            WHERE tenant_id = $1 AND deleted_at IS NULL
            ORDER BY full_name
            "#
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .into_domain()?;
        Ok(rows.into_iter().map(StaffUser::from).collect())
    }
}
