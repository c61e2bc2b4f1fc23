//! Scheduled and completed maintenance on devices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::{RecordState, TenantOwned};
use super::nullable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceKind {
    Preventive,
    Corrective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Completed,
    Cancelled,
}

impl FromStr for MaintenanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preventive" | "preventivo" => Ok(MaintenanceKind::Preventive),
            "corrective" | "correctivo" => Ok(MaintenanceKind::Corrective),
            _ => Err(format!("Unknown maintenance kind: {}", s)),
        }
    }
}

impl std::fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaintenanceKind::Preventive => write!(f, "preventive"),
            MaintenanceKind::Corrective => write!(f, "corrective"),
        }
    }
}

impl FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MaintenanceStatus::Pending),
            "completed" => Ok(MaintenanceStatus::Completed),
            "cancelled" | "canceled" => Ok(MaintenanceStatus::Cancelled),
            _ => Err(format!("Unknown maintenance status: {}", s)),
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaintenanceStatus::Pending => write!(f, "pending"),
            MaintenanceStatus::Completed => write!(f, "completed"),
            MaintenanceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Tenant always equals the device's tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub description: String,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub scheduled_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub technician: Option<String>,
    /// Set once a reminder went out; cleared when the date moves.
    pub reminded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

impl TenantOwned for Maintenance {
    fn id(&self) -> Uuid {
        self.id
    }
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
    fn state(&self) -> RecordState {
        self.state
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    pub device_id: Uuid,

    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,

    pub kind: MaintenanceKind,

    #[serde(default)]
    pub status: Option<MaintenanceStatus>,

    pub scheduled_date: NaiveDate,

    pub completed_date: Option<NaiveDate>,

    #[validate(length(max = 120, message = "technician must be at most 120 characters"))]
    pub technician: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: Option<String>,

    pub kind: Option<MaintenanceKind>,

    pub status: Option<MaintenanceStatus>,

    pub scheduled_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub completed_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub technician: Option<Option<String>>,
}

impl Maintenance {
    pub fn new(
        tenant_id: Uuid,
        request: CreateMaintenanceRequest,
        now: DateTime<Utc>,
    ) -> Self {
        let mut maintenance = Self {
            id: Uuid::new_v4(),
            tenant_id,
            device_id: request.device_id,
            description: request.description.trim().to_string(),
            kind: request.kind,
            status: request.status.unwrap_or(MaintenanceStatus::Pending),
            scheduled_date: request.scheduled_date,
            completed_date: request.completed_date,
            technician: request.technician,
            reminded_at: None,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        };
        maintenance.stamp_completion(now);
        maintenance
    }

    pub fn apply(&mut self, request: UpdateMaintenanceRequest, now: DateTime<Utc>) {
        if let Some(description) = request.description {
            self.description = description.trim().to_string();
        }
        if let Some(kind) = request.kind {
            self.kind = kind;
        }
        if let Some(status) = request.status {
            self.status = status;
        }
        if let Some(date) = request.scheduled_date {
            if date != self.scheduled_date {
                self.reminded_at = None;
            }
            self.scheduled_date = date;
        }
        if let Some(date) = request.completed_date {
            self.completed_date = date;
        }
        if let Some(technician) = request.technician {
            self.technician = technician;
        }
        self.stamp_completion(now);
        self.updated_at = now;
    }

    /// A completed maintenance always carries a completion date.
    fn stamp_completion(&mut self, now: DateTime<Utc>) {
        if self.status == MaintenanceStatus::Completed && self.completed_date.is_none() {
            self.completed_date = Some(now.date_naive());
        }
    }

    /// Pending and scheduled inside `[from, until]`.
    pub fn is_due_between(&self, from: NaiveDate, until: NaiveDate) -> bool {
        self.state.is_active()
            && self.status == MaintenanceStatus::Pending
            && self.scheduled_date >= from
            && self.scheduled_date <= until
    }

    /// Due inside `[from, until]` and not reminded about yet.
    pub fn awaits_reminder(&self, from: NaiveDate, until: NaiveDate) -> bool {
        self.reminded_at.is_none() && self.is_due_between(from, until)
    }
}

/// Filters accepted by the maintenance list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceFilter {
    pub device_id: Option<Uuid>,
    pub status: Option<MaintenanceStatus>,
}

impl MaintenanceFilter {
    pub fn matches(&self, maintenance: &Maintenance) -> bool {
        self.device_id.map_or(true, |id| maintenance.device_id == id)
            && self.status.map_or(true, |s| maintenance.status == s)
    }
}

/// A due maintenance joined with the names needed for a reminder.
#[derive(Debug, Clone)]
pub struct MaintenanceReminder {
    pub maintenance: Maintenance,
    pub device_name: String,
    pub tenant_name: String,
}
