//! Maintenance repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Maintenance, MaintenanceFilter, MaintenanceReminder, MaintenanceStatus, Page};
use domain::services::scope::TenantScope;
use domain::store::MaintenanceStore;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_one, scope_ids};
use crate::db::snapshot;
use crate::entities::maintenance::MAINTENANCE_COLUMNS;
use crate::entities::{MaintenanceReminderRow, MaintenanceRow};
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: PgPool,
}

impl MaintenanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceStore for MaintenanceRepository {
    async fn insert(&self, maintenance: &Maintenance) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO maintenances
                (id, tenant_id, device_id, description, kind, status, scheduled_date,
                 completed_date, technician, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(maintenance.id)
        .bind(maintenance.tenant_id)
        .bind(maintenance.device_id)
        .bind(&maintenance.description)
        .bind(maintenance.kind.to_string())
        .bind(maintenance.status.to_string())
        .bind(maintenance.scheduled_date)
        .bind(maintenance.completed_date)
        .bind(&maintenance.technician)
        .bind(maintenance.created_at)
        .bind(maintenance.updated_at)
        .execute(&self.pool)
        .await;
        result.into_domain().map(|_| ())
    }

    async fn update(&self, scope: &TenantScope, maintenance: &Maintenance) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE maintenances
            SET description = $2, kind = $3, status = $4, scheduled_date = $5,
                completed_date = $6, technician = $7, reminded_at = $8, updated_at = $9
            WHERE id = $1 AND deleted_at IS NULL
              AND ($10::uuid[] IS NULL OR tenant_id = ANY($10))
            "#,
        )
        .bind(maintenance.id)
        .bind(&maintenance.description)
        .bind(maintenance.kind.to_string())
        .bind(maintenance.status.to_string())
        .bind(maintenance.scheduled_date)
        .bind(maintenance.completed_date)
        .bind(&maintenance.technician)
        .bind(maintenance.reminded_at)
        .bind(maintenance.updated_at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Maintenance")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE maintenances SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
              AND ($3::uuid[] IS NULL OR tenant_id = ANY($3))
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(scope_ids(scope))
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Maintenance")
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Maintenance>> {
        let row = sqlx::query_as::<_, MaintenanceRow>(&format!(
            r#"
            SELECT {MAINTENANCE_COLUMNS} FROM maintenances
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        row.map(Maintenance::try_from).transpose()
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Maintenance>> {
        let timer = QueryTimer::new("maintenance_list");
        let ids = scope_ids(scope);
        let status = filter.status.as_ref().map(ToString::to_string);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM maintenances
            WHERE deleted_at IS NULL
              AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
              AND ($2::uuid IS NULL OR device_id = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(&ids)
        .bind(filter.device_id)
        .bind(&status)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;

        let rows = sqlx::query_as::<_, MaintenanceRow>(&format!(
            r#"
            SELECT {MAINTENANCE_COLUMNS} FROM maintenances
            WHERE deleted_at IS NULL
              AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
              AND ($2::uuid IS NULL OR device_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY scheduled_date DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(&ids)
        .bind(filter.device_id)
        .bind(&status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await
        .into_domain()?;

        tx.commit().await.into_domain()?;
        timer.record();
        let maintenances = rows
            .into_iter()
            .map(Maintenance::try_from)
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Page::new(maintenances, total, page))
    }

    async fn list_due(&self, from: NaiveDate, until: NaiveDate) -> DomainResult<Vec<MaintenanceReminder>> {
        let timer = QueryTimer::new("maintenance_list_due");
        let rows = sqlx::query_as::<_, MaintenanceReminderRow>(
            r#"
            SELECT m.id, m.tenant_id, m.device_id, m.description, m.kind, m.status,
                   m.scheduled_date, m.completed_date, m.technician, m.reminded_at,
                   m.created_at, m.updated_at, m.deleted_at,
                   d.name AS device_name, t.name AS tenant_name
            FROM maintenances m
            JOIN devices d ON d.id = m.device_id AND d.deleted_at IS NULL
            JOIN tenants t ON t.id = m.tenant_id AND t.deleted_at IS NULL
            WHERE m.deleted_at IS NULL
              AND m.status = $1
              AND m.scheduled_date BETWEEN $2 AND $3
              AND m.reminded_at IS NULL
            ORDER BY m.scheduled_date
            "#,
        )
        .bind(MaintenanceStatus::Pending.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .into_domain()?;
        timer.record();
        rows.into_iter().map(MaintenanceReminder::try_from).collect()
    }

    async fn mark_reminded(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE maintenances SET reminded_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await;
        expect_one(result.into_domain()?.rows_affected(), "Maintenance")
    }
}
