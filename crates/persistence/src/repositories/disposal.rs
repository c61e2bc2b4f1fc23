//! Disposal (decommission record) repository.

use async_trait::async_trait;
use domain::error::{DomainError, DomainResult};
use domain::models::{Device, Disposal, Page};
use domain::services::scope::TenantScope;
use domain::store::{DeviceUpdate, DisposalStore};
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::device::{lock_live_row, overwrite_row};
use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::disposal::DISPOSAL_COLUMNS;
use crate::entities::DisposalRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct DisposalRepository {
    pool: PgPool,
}

impl DisposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DisposalStore for DisposalRepository {
    async fn insert_with_device(
        &self,
        scope: &TenantScope,
        disposal: &Disposal,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)> {
        let timer = QueryTimer::new("disposal_insert");
        let mut tx = self.pool.begin().await.into_domain()?;

        let prior = lock_live_row(&mut tx, scope, disposal.device_id).await?;
        let next = apply(&prior)?;

        let result = sqlx::query(&format!(
            "INSERT INTO disposals ({DISPOSAL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(disposal.id)
        .bind(disposal.tenant_id)
        .bind(disposal.device_id)
        .bind(disposal.disposal_date)
        .bind(&disposal.reason)
        .bind(&disposal.authorized_by)
        .bind(&disposal.notes)
        .bind(disposal.recorded_by)
        .bind(disposal.created_at)
        .bind(disposal.updated_at)
        .execute(&mut *tx)
        .await;
        match result.into_domain() {
            Ok(_) => {}
            Err(DomainError::Conflict(_)) => {
                return Err(DomainError::Conflict(
                    "device already has a disposal record".into(),
                ))
            }
            Err(e) => return Err(e),
        }

        if next != prior {
            overwrite_row(&mut tx, &next).await?;
        }
        tx.commit().await.into_domain()?;
        timer.record();
        Ok((prior, next))
    }

    async fn update(&self, scope: &TenantScope, disposal: &Disposal) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE disposals
            SET disposal_date = $2, reason = $3, authorized_by = $4, notes = $5, updated_at = $6
            WHERE id = $1 AND ($7::uuid[] IS NULL OR tenant_id = ANY($7))
            "#,
        )
        .bind(disposal.id)
        .bind(disposal.disposal_date)
        .bind(&disposal.reason)
        .bind(&disposal.authorized_by)
        .bind(&disposal.notes)
        .bind(disposal.updated_at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Disposal")
    }

    async fn delete(&self, scope: &TenantScope, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query(
            "DELETE FROM disposals WHERE id = $1 AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))",
        )
        .bind(id)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Disposal")
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Disposal>> {
        let row = sqlx::query_as::<_, DisposalRow>(&format!(
            r#"
            SELECT {DISPOSAL_COLUMNS} FROM disposals
            WHERE id = $1 AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Disposal::from))
    }

    async fn find_by_device(&self, scope: &TenantScope, device_id: Uuid) -> DomainResult<Option<Disposal>> {
        let row = sqlx::query_as::<_, DisposalRow>(&format!(
            r#"
            SELECT {DISPOSAL_COLUMNS} FROM disposals
            WHERE device_id = $1 AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(device_id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Disposal::from))
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Disposal>> {
        let timer = QueryTimer::new("disposal_list");
        let ids = scope_ids(scope);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM disposals WHERE ($1::uuid[] IS NULL OR tenant_id = ANY($1))",
        )
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, DisposalRow>(&format!(
            r#"
            SELECT {DISPOSAL_COLUMNS} FROM disposals
            WHERE ($1::uuid[] IS NULL OR tenant_id = ANY($1))
            ORDER BY disposal_date DESC
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
        Ok(Page::new(rows.into_iter().map(Disposal::from).collect(), total, page))
    }
}
