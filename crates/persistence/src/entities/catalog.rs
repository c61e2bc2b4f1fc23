use chrono::{DateTime, Utc};
use domain::models::{CatalogEntry, CatalogKind};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog tables share one shape; the kind comes from the table queried.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogRow {
    pub id: Uuid,
    pub name: String,
    pub name_key: String,
    pub created_at: DateTime<Utc>,
}

impl CatalogRow {
    pub fn into_entry(self, kind: CatalogKind) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            kind,
            name: self.name,
            name_key: self.name_key,
            created_at: self.created_at,
        }
    }
}
