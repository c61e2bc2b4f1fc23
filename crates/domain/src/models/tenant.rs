//! Tenant ("hotel") domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::RecordState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub state: RecordState,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: String,

    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: Option<String>,

    pub active: Option<bool>,
}

impl Tenant {
    pub fn new(request: CreateTenantRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            code: request.code.trim().to_uppercase(),
            active: request.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }

    pub fn apply(&mut self, request: UpdateTenantRequest, now: DateTime<Utc>) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(code) = request.code {
            self.code = code.trim().to_uppercase();
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tenant_normalizes_code() {
        let tenant = Tenant::new(
            CreateTenantRequest {
                name: " Hotel Playa ".into(),
                code: "hpl".into(),
                active: None,
            },
            Utc::now(),
        );
        assert_eq!(tenant.name, "Hotel Playa");
        assert_eq!(tenant.code, "HPL");
        assert!(tenant.active);
        assert!(tenant.state.is_active());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateTenantRequest {
            name: String::new(),
            code: "A".into(),
            active: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let tenant = Tenant::new(
            CreateTenantRequest {
                name: "Hotel Centro".into(),
                code: "HCE".into(),
                active: Some(false),
            },
            Utc::now(),
        );
        let json = serde_json::to_value(&tenant).unwrap();
        assert_eq!(json["code"], "HCE");
        assert_eq!(json["active"], false);
        assert!(json["deletedAt"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
