//! Formal disposal records. At most one per device; hard-deletable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::{RecordState, TenantOwned};
use super::nullable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Disposal {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub disposal_date: NaiveDate,
    pub reason: String,
    pub authorized_by: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Disposal {
    fn id(&self) -> Uuid {
        self.id
    }
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
    fn state(&self) -> RecordState {
        RecordState::Active
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisposalRequest {
    pub device_id: Uuid,

    /// Defaults to today.
    pub disposal_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 500, message = "reason must be 1-500 characters"))]
    pub reason: String,

    #[validate(length(max = 120, message = "authorizedBy must be at most 120 characters"))]
    pub authorized_by: Option<String>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDisposalRequest {
    pub disposal_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 500, message = "reason must be 1-500 characters"))]
    pub reason: Option<String>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub authorized_by: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub notes: Option<Option<String>>,
}

impl Disposal {
    pub fn new(
        tenant_id: Uuid,
        request: CreateDisposalRequest,
        recorded_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            device_id: request.device_id,
            disposal_date: request.disposal_date.unwrap_or_else(|| now.date_naive()),
            reason: request.reason.trim().to_string(),
            authorized_by: request.authorized_by,
            notes: request.notes,
            recorded_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, request: UpdateDisposalRequest, now: DateTime<Utc>) {
        if let Some(date) = request.disposal_date {
            self.disposal_date = date;
        }
        if let Some(reason) = request.reason {
            self.reason = reason.trim().to_string();
        }
        if let Some(authorized_by) = request.authorized_by {
            self.authorized_by = authorized_by;
        }
        if let Some(notes) = request.notes {
            self.notes = notes;
        }
        self.updated_at = now;
    }
}
