//! Catalog repository. The three catalogs share one table shape, so the
//! table name is picked from the kind.

use async_trait::async_trait;
use chrono::Utc;
use domain::error::{DomainError, DomainResult};
use domain::models::{CatalogEntry, CatalogKind};
use domain::store::CatalogStore;
use shared::text::normalize_key;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CatalogRow;
use crate::error::IntoDomain;
use crate::metrics::QueryTimer;

const CATALOG_COLUMNS: &str = "id, name, name_key, created_at";

/// Device column that references entries of `kind`.
fn device_column(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::DeviceType => "type_id",
        CatalogKind::DeviceStatus => "status_id",
        CatalogKind::OperatingSystem => "os_id",
    }
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(&self, kind: CatalogKind, key: &str) -> DomainResult<Option<CatalogEntry>> {
        let row = sqlx::query_as::<_, CatalogRow>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM {} WHERE name_key = $1",
            kind.table()
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(|r| r.into_entry(kind)))
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn list(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogRow>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM {} ORDER BY name",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .into_domain()?;
        Ok(rows.into_iter().map(|r| r.into_entry(kind)).collect())
    }

    async fn find(&self, kind: CatalogKind, id: Uuid) -> DomainResult<Option<CatalogEntry>> {
        let row = sqlx::query_as::<_, CatalogRow>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM {} WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .into_domain()?;
        Ok(row.map(|r| r.into_entry(kind)))
    }

    async fn insert(&self, entry: &CatalogEntry) -> DomainResult<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (id, name, name_key, created_at) VALUES ($1, $2, $3, $4)",
            entry.kind.table()
        ))
        .bind(entry.id)
        .bind(&entry.name)
        .bind(&entry.name_key)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await;
        match result.into_domain() {
            Ok(_) => Ok(()),
            Err(DomainError::Conflict(_)) => {
                Err(DomainError::Conflict(format!("{} already exists", entry.name)))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_or_create(&self, kind: CatalogKind, name: &str) -> DomainResult<CatalogEntry> {
        let timer = QueryTimer::new("catalog_get_or_create");
        let candidate = CatalogEntry::new(kind, name, Utc::now());
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, name, name_key, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name_key) DO NOTHING
            "#,
            kind.table()
        ))
        .bind(candidate.id)
        .bind(&candidate.name)
        .bind(&candidate.name_key)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .into_domain()?;

        let entry = self
            .find_by_key(kind, &candidate.name_key)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("{} vanished after insert", name)))?;
        timer.record();
        Ok(entry)
    }

    async fn rename(&self, kind: CatalogKind, id: Uuid, name: &str) -> DomainResult<CatalogEntry> {
        let row = sqlx::query_as::<_, CatalogRow>(&format!(
            r#"
            UPDATE {} SET name = $2, name_key = $3
            WHERE id = $1
            RETURNING {CATALOG_COLUMNS}
            "#,
            kind.table()
        ))
        .bind(id)
        .bind(name.trim())
        .bind(normalize_key(name))
        .fetch_optional(&self.pool)
        .await;
        match row.into_domain() {
            Ok(Some(row)) => Ok(row.into_entry(kind)),
            Ok(None) => Err(DomainError::not_found("Catalog entry")),
            Err(DomainError::Conflict(_)) => {
                Err(DomainError::Conflict(format!("{} already exists", name.trim())))
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, kind: CatalogKind, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.into_domain()?;

        let (referenced,): (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS (SELECT 1 FROM devices WHERE {} = $1)",
            device_column(kind)
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .into_domain()?;
        if referenced {
            return Err(DomainError::DependencyInUse(
                "catalog entry is referenced by devices".into(),
            ));
        }

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&mut *tx)
            .await
            .into_domain()?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Catalog entry"));
        }
        tx.commit().await.into_domain()?;
        Ok(())
    }
}
