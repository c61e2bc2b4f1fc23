//! Global reference catalogs: device types, device statuses and operating systems.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::normalize_key;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Normalized status names that mark a device as disposed.
pub const DISPOSED_STATUS_KEYS: &[&str] = &["baja", "dado de baja", "disposed", "decommissioned"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    DeviceType,
    DeviceStatus,
    OperatingSystem,
}

impl CatalogKind {
    pub fn all() -> &'static [CatalogKind] {
        &[
            CatalogKind::DeviceType,
            CatalogKind::DeviceStatus,
            CatalogKind::OperatingSystem,
        ]
    }

    /// Path segment used by the HTTP layer.
    pub fn slug(&self) -> &'static str {
        match self {
            CatalogKind::DeviceType => "device-types",
            CatalogKind::DeviceStatus => "device-statuses",
            CatalogKind::OperatingSystem => "operating-systems",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::DeviceType => "device_types",
            CatalogKind::DeviceStatus => "device_statuses",
            CatalogKind::OperatingSystem => "operating_systems",
        }
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "device-types" | "device-type" | "types" => Ok(CatalogKind::DeviceType),
            "device-statuses" | "device-status" | "statuses" => Ok(CatalogKind::DeviceStatus),
            "operating-systems" | "operating-system" | "os" => Ok(CatalogKind::OperatingSystem),
            _ => Err(format!("Unknown catalog: {}", s)),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    /// Unique comparison key derived from `name`.
    #[serde(skip)]
    pub name_key: String,
    pub created_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn new(kind: CatalogKind, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.trim().to_string(),
            name_key: normalize_key(name),
            created_at: now,
        }
    }

    /// Whether this entry is the distinguished "disposed" status.
    pub fn is_disposed_status(&self) -> bool {
        self.kind == CatalogKind::DeviceStatus && is_disposed_name(&self.name)
    }
}

pub fn is_disposed_name(name: &str) -> bool {
    DISPOSED_STATUS_KEYS.contains(&normalize_key(name).as_str())
}

/// Ids of the status entries that mean "disposed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisposedStatuses(HashSet<Uuid>);

impl DisposedStatuses {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> Self {
        Self(
            entries
                .into_iter()
                .filter(|e| e.is_disposed_status())
                .map(|e| e.id)
                .collect(),
        )
    }

    pub fn contains(&self, status_id: Option<Uuid>) -> bool {
        status_id.map(|id| self.0.contains(&id)).unwrap_or(false)
    }

    /// Tracks a status created after the set was loaded.
    pub fn observe(&mut self, entry: &CatalogEntry) {
        if entry.is_disposed_status() {
            self.0.insert(entry.id);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CatalogNameRequest {
    #[validate(length(min = 1, max = 80, message = "name must be 1-80 characters"))]
    pub name: String,
}
