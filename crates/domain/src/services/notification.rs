//! Outbound notifications.
//!
//! The domain only knows the `send(recipient, template)` capability; delivery
//! (mail, console, ...) is provided by the binary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MaintenanceKind, MaintenanceReminder};

/// Template identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    MaintenanceReminder,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::MaintenanceReminder => write!(f, "maintenance_reminder"),
        }
    }
}

/// Template data for an upcoming maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReminderPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub maintenance_id: Uuid,
    pub tenant_name: String,
    pub device_name: String,
    pub description: String,
    pub kind: MaintenanceKind,
    pub scheduled_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
}

impl From<&MaintenanceReminder> for MaintenanceReminderPayload {
    fn from(reminder: &MaintenanceReminder) -> Self {
        Self {
            notification_type: NotificationType::MaintenanceReminder,
            maintenance_id: reminder.maintenance.id,
            tenant_name: reminder.tenant_name.clone(),
            device_name: reminder.device_name.clone(),
            description: reminder.maintenance.description.clone(),
            kind: reminder.maintenance.kind,
            scheduled_date: reminder.maintenance.scheduled_date,
            technician: reminder.maintenance.technician.clone(),
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// Delivery failed; the caller carries on with the next recipient.
    Failed(String),
    /// Nothing to deliver to (e.g. notifications disabled).
    Skipped,
}

#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, recipient: &str, template: &MaintenanceReminderPayload) -> NotificationResult;
}

/// Mock notification service for development and testing.
///
/// Logs notifications but doesn't actually send them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    pub simulate_failure: bool,
    /// Recipients that always fail, to exercise per-recipient isolation.
    pub failing_recipients: Vec<String>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock where every send fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            failing_recipients: Vec::new(),
        }
    }

    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            simulate_failure: false,
            failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send(&self, recipient: &str, template: &MaintenanceReminderPayload) -> NotificationResult {
        if self.simulate_failure || self.failing_recipients.iter().any(|r| r == recipient) {
            tracing::warn!(
                recipient = %recipient,
                maintenance_id = %template.maintenance_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            recipient = %recipient,
            notification_type = %template.notification_type,
            maintenance_id = %template.maintenance_id,
            device = %template.device_name,
            "Mock: Would send maintenance reminder"
        );
        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MaintenanceReminderPayload {
        MaintenanceReminderPayload {
            notification_type: NotificationType::MaintenanceReminder,
            maintenance_id: Uuid::nil(),
            tenant_name: "Hotel Centro".into(),
            device_name: "Servidor PMS".into(),
            description: "Limpieza de ventiladores".into(),
            kind: MaintenanceKind::Preventive,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            technician: None,
        }
    }

    #[test]
    fn test_payload_serialization() {
        let json = serde_json::to_string(&payload()).unwrap();
        assert!(json.contains("\"type\":\"maintenance_reminder\""));
        assert!(json.contains("\"scheduledDate\":\"2026-03-01\""));
        assert!(!json.contains("technician"));
    }

    #[tokio::test]
    async fn test_mock_send() {
        let service = MockNotificationService::new();
        assert_eq!(service.send("it@hotel.test", &payload()).await, NotificationResult::Sent);
    }

    #[tokio::test]
    async fn test_mock_failures() {
        assert!(matches!(
            MockNotificationService::failing().send("a@hotel.test", &payload()).await,
            NotificationResult::Failed(_)
        ));

        let partial = MockNotificationService::failing_for(&["down@hotel.test"]);
        assert!(matches!(
            partial.send("down@hotel.test", &payload()).await,
            NotificationResult::Failed(_)
        ));
        assert_eq!(partial.send("up@hotel.test", &payload()).await, NotificationResult::Sent);
    }
}
