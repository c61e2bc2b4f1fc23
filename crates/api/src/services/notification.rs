//! Console delivery for maintenance reminders.

use async_trait::async_trait;
use domain::services::{MaintenanceReminderPayload, NotificationResult, NotificationService};
use tracing::info;

/// Writes each reminder to the log instead of delivering it. Used until a
/// mail transport is configured.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotificationService;

impl ConsoleNotificationService {
    pub fn subject(template: &MaintenanceReminderPayload) -> String {
        format!(
            "[{}] {} maintenance for {} on {}",
            template.tenant_name,
            template.kind,
            template.device_name,
            template.scheduled_date.format("%d/%m/%Y")
        )
    }
}

#[async_trait]
impl NotificationService for ConsoleNotificationService {
    async fn send(&self, recipient: &str, template: &MaintenanceReminderPayload) -> NotificationResult {
        if recipient.trim().is_empty() {
            return NotificationResult::Skipped;
        }

        info!(
            to = %recipient,
            notification_type = %template.notification_type,
            maintenance_id = %template.maintenance_id,
            subject = %Self::subject(template),
            technician = ?template.technician,
            "Notification (console provider)"
        );
        NotificationResult::Sent
    }
}
