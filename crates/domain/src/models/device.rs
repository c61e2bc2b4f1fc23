//! Device domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_date_window, validate_ip_address, validate_mac_address};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::lifecycle::{RecordState, TenantOwned};
use super::nullable;

/// A tracked IT asset.
///
/// `disposal_date`, `disposal_reason` and `disposal_notes` are only ever set while
/// `status_id` points at the disposed status; see `services::lifecycle`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub tag: Option<String>,
    pub name: String,
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub type_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub os_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
    pub disposal_date: Option<DateTime<Utc>>,
    pub disposal_reason: Option<String>,
    pub disposal_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

impl TenantOwned for Device {
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

impl Device {
    /// A blank live device; callers fill in attributes before persisting.
    pub fn blank(tenant_id: Uuid, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            tag: None,
            name: name.trim().to_string(),
            serial: None,
            brand: None,
            model: None,
            ip_address: None,
            mac_address: None,
            type_id: None,
            status_id: None,
            os_id: None,
            area_id: None,
            assigned_user_id: None,
            warranty_start: None,
            warranty_end: None,
            disposal_date: None,
            disposal_reason: None,
            disposal_notes: None,
            notes: None,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }

    /// Human readable label for error messages: name, else serial.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.serial.clone().unwrap_or_default()
        } else {
            self.name.clone()
        }
    }

    pub fn has_disposal_fields(&self) -> bool {
        self.disposal_date.is_some() || self.disposal_reason.is_some() || self.disposal_notes.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_device"))]
pub struct CreateDeviceRequest {
    pub tenant_id: Option<Uuid>,

    #[validate(length(max = 60, message = "tag must be at most 60 characters"))]
    pub tag: Option<String>,

    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(max = 80, message = "serial must be at most 80 characters"))]
    pub serial: Option<String>,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub type_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub os_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
    pub disposal_date: Option<DateTime<Utc>>,
    pub disposal_reason: Option<String>,
    pub disposal_notes: Option<String>,
    pub notes: Option<String>,
}

/// Partial device update. For `Option<Option<T>>` fields an absent key leaves the
/// value untouched and an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_device"))]
pub struct UpdateDeviceRequest {
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub tag: Option<Option<String>>,

    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub serial: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub brand: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub model: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub ip_address: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub mac_address: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub type_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub status_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub os_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub area_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub assigned_user_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub warranty_start: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub warranty_end: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub disposal_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub disposal_reason: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub disposal_notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub notes: Option<Option<String>>,
}

fn check_network(ip: Option<&str>, mac: Option<&str>) -> Result<(), ValidationError> {
    if let Some(ip) = ip {
        validate_ip_address(ip)?;
    }
    if let Some(mac) = mac {
        validate_mac_address(mac)?;
    }
    Ok(())
}

fn validate_create_device(request: &CreateDeviceRequest) -> Result<(), ValidationError> {
    check_network(request.ip_address.as_deref(), request.mac_address.as_deref())?;
    validate_date_window(request.warranty_start, request.warranty_end)
}

fn validate_update_device(request: &UpdateDeviceRequest) -> Result<(), ValidationError> {
    check_network(
        request.ip_address.as_ref().and_then(|v| v.as_deref()),
        request.mac_address.as_ref().and_then(|v| v.as_deref()),
    )?;
    validate_date_window(
        request.warranty_start.flatten(),
        request.warranty_end.flatten(),
    )
}

/// Filters accepted by the device list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFilter {
    pub area_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    /// Case-insensitive match on name, tag or serial.
    pub search: Option<String>,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        if self.area_id.is_some() && device.area_id != self.area_id {
            return false;
        }
        if self.status_id.is_some() && device.status_id != self.status_id {
            return false;
        }
        if self.assigned_user_id.is_some() && device.assigned_user_id != self.assigned_user_id {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [Some(&device.name), device.tag.as_ref(), device.serial.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|v| v.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}
