//! Device repository.
//!
//! Writes that depend on the current row (`update_with`, `upsert_by_serial`,
//! and the disposal insert) lock it with `SELECT ... FOR UPDATE` and compute the replacement inside the
//! same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::{DomainError, DomainResult};
use domain::models::{Device, DeviceFilter, Page};
use domain::services::scope::TenantScope;
use domain::store::{DeviceStore, DeviceUpdate, DeviceUpsert};
use shared::pagination::PageRequest;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::scope_ids;
use crate::db::snapshot;
use crate::entities::device::DEVICE_COLUMNS;
use crate::entities::DeviceRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

const FILTER_CLAUSE: &str = r#"
    deleted_at IS NULL
    AND ($1::uuid[] IS NULL OR tenant_id = ANY($1))
    AND ($2::uuid IS NULL OR area_id = $2)
    AND ($3::uuid IS NULL OR status_id = $3)
    AND ($4::uuid IS NULL OR assigned_user_id = $4)
    AND ($5::text IS NULL
         OR name ILIKE '%' || $5 || '%'
         OR tag ILIKE '%' || $5 || '%'
         OR serial ILIKE '%' || $5 || '%')
"#;

/// Rewrites unique violations into messages naming the duplicated key.
fn explain_conflict(err: DomainError, device: &Device) -> DomainError {
    match err {
        DomainError::Conflict(message) if message.contains("devices_tenant_serial_key") => {
            DomainError::Conflict(format!(
                "serial {} already exists",
                device.serial.as_deref().unwrap_or_default()
            ))
        }
        DomainError::Conflict(message) if message.contains("devices_tenant_tag_live_key") => {
            DomainError::Conflict(format!(
                "tag {} already exists",
                device.tag.as_deref().unwrap_or_default()
            ))
        }
        other => other,
    }
}

fn search_term(filter: &DeviceFilter) -> Option<String> {
    filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"))
}

async fn insert_row(conn: &mut PgConnection, device: &Device) -> DomainResult<()> {
    sqlx::query(&format!(
        r#"
        INSERT INTO devices ({DEVICE_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23)
        "#
    ))
    .bind(device.id)
    .bind(device.tenant_id)
    .bind(&device.tag)
    .bind(&device.name)
    .bind(&device.serial)
    .bind(&device.brand)
    .bind(&device.model)
    .bind(&device.ip_address)
    .bind(&device.mac_address)
    .bind(device.type_id)
    .bind(device.status_id)
    .bind(device.os_id)
    .bind(device.area_id)
    .bind(device.assigned_user_id)
    .bind(device.warranty_start)
    .bind(device.warranty_end)
    .bind(device.disposal_date)
    .bind(&device.disposal_reason)
    .bind(&device.disposal_notes)
    .bind(&device.notes)
    .bind(device.created_at)
    .bind(device.updated_at)
    .bind(device.state.deleted_at())
    .execute(conn)
    .await
    .into_domain()
    .map(|_| ())
    .map_err(|e| explain_conflict(e, device))
}

/// Locks a live device visible in `scope` for the rest of the transaction.
pub(crate) async fn lock_live_row(
    conn: &mut PgConnection,
    scope: &TenantScope,
    id: Uuid,
) -> DomainResult<Device> {
    sqlx::query_as::<_, DeviceRow>(&format!(
        r#"
        SELECT {DEVICE_COLUMNS} FROM devices
        WHERE id = $1 AND deleted_at IS NULL
          AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
        FOR UPDATE
        "#
    ))
    .bind(id)
    .bind(scope_ids(scope))
    .fetch_optional(conn)
    .await
    .into_domain()?
    .map(Device::from)
    .ok_or_else(|| DomainError::not_found("Device"))
}

/// Overwrites every mutable column, `deleted_at` included.
pub(crate) async fn overwrite_row(conn: &mut PgConnection, device: &Device) -> DomainResult<()> {
    sqlx::query(
        r#"
        UPDATE devices
        SET tag = $2, name = $3, serial = $4, brand = $5, model = $6,
            ip_address = $7, mac_address = $8, type_id = $9, status_id = $10, os_id = $11,
            area_id = $12, assigned_user_id = $13, warranty_start = $14, warranty_end = $15,
            disposal_date = $16, disposal_reason = $17, disposal_notes = $18, notes = $19,
            updated_at = $20, deleted_at = $21
        WHERE id = $1
        "#,
    )
    .bind(device.id)
    .bind(&device.tag)
    .bind(&device.name)
    .bind(&device.serial)
    .bind(&device.brand)
    .bind(&device.model)
    .bind(&device.ip_address)
    .bind(&device.mac_address)
    .bind(device.type_id)
    .bind(device.status_id)
    .bind(device.os_id)
    .bind(device.area_id)
    .bind(device.assigned_user_id)
    .bind(device.warranty_start)
    .bind(device.warranty_end)
    .bind(device.disposal_date)
    .bind(&device.disposal_reason)
    .bind(&device.disposal_notes)
    .bind(&device.notes)
    .bind(device.updated_at)
    .bind(device.state.deleted_at())
    .execute(conn)
    .await
    .into_domain()
    .map(|_| ())
    .map_err(|e| explain_conflict(e, device))
}

#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for DeviceRepository {
    async fn insert(&self, device: &Device) -> DomainResult<()> {
        let timer = QueryTimer::new("device_insert");
        let mut conn = self.pool.acquire().await.into_domain()?;
        let result = insert_row(&mut conn, device).await;
        timer.record();
        result
    }

    async fn update_with(
        &self,
        scope: &TenantScope,
        id: Uuid,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)> {
        let timer = QueryTimer::new("device_update");
        let mut tx = self.pool.begin().await.into_domain()?;

        let prior = lock_live_row(&mut tx, scope, id).await?;
        let next = apply(&prior)?;
        overwrite_row(&mut tx, &next).await?;
        tx.commit().await.into_domain()?;
        timer.record();
        Ok((prior, next))
    }

    async fn upsert_by_serial(
        &self,
        tenant_id: Uuid,
        serial: &str,
        apply: DeviceUpsert<'_>,
    ) -> DomainResult<(Option<Device>, Device)> {
        let timer = QueryTimer::new("device_upsert_by_serial");
        let mut tx = self.pool.begin().await.into_domain()?;

        let prior: Option<Device> = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS} FROM devices
            WHERE tenant_id = $1 AND serial = $2
            FOR UPDATE
            "#
        ))
        .bind(tenant_id)
        .bind(serial)
        .fetch_optional(&mut *tx)
        .await
        .into_domain()?
        .map(Device::from);

        let next = apply(prior.as_ref())?;
        match &prior {
            Some(_) => overwrite_row(&mut tx, &next).await?,
            None => insert_row(&mut tx, &next).await?,
        }
        tx.commit().await.into_domain()?;
        timer.record();
        Ok((prior, next))
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let timer = QueryTimer::new("device_soft_delete");
        let mut tx = self.pool.begin().await.into_domain()?;

        let locked: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM devices
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
            return Err(DomainError::not_found("Device"));
        }

        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM maintenances WHERE device_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;
        if in_use {
            return Err(DomainError::DependencyInUse("device still has maintenances".into()));
        }

        sqlx::query("UPDATE devices SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .into_domain()?;
        tx.commit().await.into_domain()?;
        timer.record();
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Device>> {
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS} FROM devices
            WHERE id = $1 AND deleted_at IS NULL
              AND ($2::uuid[] IS NULL OR tenant_id = ANY($2))
            "#
        ))
        .bind(id)
        .bind(scope_ids(scope))
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(Device::from))
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Device>> {
        let timer = QueryTimer::new("device_list");
        let ids = scope_ids(scope);
        let search = search_term(filter);
        let mut tx = snapshot(&self.pool).await.into_domain()?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM devices WHERE {FILTER_CLAUSE}"))
                .bind(&ids)
                .bind(filter.area_id)
                .bind(filter.status_id)
                .bind(filter.assigned_user_id)
                .bind(&search)
                .fetch_one(&mut *tx)
                .await
                .into_domain()?;

        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS} FROM devices
            WHERE {FILTER_CLAUSE}
            ORDER BY name
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(&ids)
        .bind(filter.area_id)
        .bind(filter.status_id)
        .bind(filter.assigned_user_id)
        .bind(&search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await
        .into_domain()?;

        tx.commit().await.into_domain()?;
        timer.record();
        Ok(Page::new(rows.into_iter().map(Device::from).collect(), total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_conflict_names_serial() {
        let mut device = Device::blank(Uuid::new_v4(), "PC", Utc::now());
        device.serial = Some("SN-9".into());
        let err = explain_conflict(
            DomainError::Conflict("duplicate value violates devices_tenant_serial_key".into()),
            &device,
        );
        assert!(matches!(err, DomainError::Conflict(m) if m == "serial SN-9 already exists"));
    }

    #[test]
    fn test_explain_conflict_passes_other_errors() {
        let device = Device::blank(Uuid::new_v4(), "PC", Utc::now());
        let err = explain_conflict(DomainError::not_found("Device"), &device);
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_search_term_escapes_wildcards() {
        let filter = DeviceFilter {
            search: Some(" 50%_off ".into()),
            ..Default::default()
        };
        assert_eq!(search_term(&filter).as_deref(), Some("50\\%\\_off"));
        assert_eq!(search_term(&DeviceFilter::default()), None);
    }
}
