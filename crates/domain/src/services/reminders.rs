//! Maintenance reminders sent to the admins of each hotel.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::notification::{MaintenanceReminderPayload, NotificationResult, NotificationService};
use crate::error::DomainResult;
use crate::models::Principal;
use crate::store::{MaintenanceStore, PrincipalStore};

/// Outcome counters of one reminder run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunReport {
    /// Due maintenances found.
    pub considered: u32,
    pub sent: u32,
    /// Failed sends plus maintenances whose hotel recipients could not be loaded.
    pub failed: u32,
    /// Maintenances with no recipient plus sends the notifier skipped.
    pub skipped: u32,
}

#[derive(Clone)]
pub struct ReminderService {
    maintenances: Arc<dyn MaintenanceStore>,
    principals: Arc<dyn PrincipalStore>,
    notifier: Arc<dyn NotificationService>,
    window_days: u32,
}

impl ReminderService {
    pub fn new(
        maintenances: Arc<dyn MaintenanceStore>,
        principals: Arc<dyn PrincipalStore>,
        notifier: Arc<dyn NotificationService>,
        window_days: u32,
    ) -> Self {
        Self {
            maintenances,
            principals,
            notifier,
            window_days,
        }
    }

    /// Notifies about pending maintenances scheduled between today and
    /// today + window that have not been reminded about yet. A maintenance is
    /// marked as reminded once at least one admin received the message. A
    /// failing hotel or recipient never stops the run.
    pub async fn run(&self, now: DateTime<Utc>) -> DomainResult<ReminderRunReport> {
        let from = now.date_naive();
        let until = from + Duration::days(i64::from(self.window_days));

        let due = self.maintenances.list_due(from, until).await?;
        let mut report = ReminderRunReport {
            considered: due.len() as u32,
            ..Default::default()
        };
        // `None` marks a hotel whose recipient lookup failed during this run.
        let mut recipients: HashMap<Uuid, Option<Vec<Principal>>> = HashMap::new();

        for reminder in &due {
            let tenant_id = reminder.maintenance.tenant_id;
            if !recipients.contains_key(&tenant_id) {
                let admins = match self.principals.list_notification_recipients(tenant_id).await {
                    Ok(admins) => Some(admins),
                    Err(e) => {
                        tracing::warn!(
                            tenant_id = %tenant_id,
                            error = %e,
                            "Could not load reminder recipients for hotel"
                        );
                        None
                    }
                };
                recipients.insert(tenant_id, admins);
            }
            let Some(admins) = recipients.get(&tenant_id).and_then(|a| a.as_deref()) else {
                report.failed += 1;
                continue;
            };

            if admins.is_empty() {
                tracing::debug!(
                    maintenance_id = %reminder.maintenance.id,
                    tenant_id = %tenant_id,
                    "No reminder recipients for hotel"
                );
                report.skipped += 1;
                continue;
            }

            let payload = MaintenanceReminderPayload::from(reminder);
            let mut delivered = false;
            for admin in admins {
                let Some(email) = admin.email.as_deref() else {
                    continue;
                };
                match self.notifier.send(email, &payload).await {
                    NotificationResult::Sent => {
                        report.sent += 1;
                        delivered = true;
                    }
                    NotificationResult::Skipped => report.skipped += 1,
                    NotificationResult::Failed(reason) => {
                        tracing::warn!(
                            maintenance_id = %reminder.maintenance.id,
                            recipient = %email,
                            reason = %reason,
                            "Maintenance reminder failed"
                        );
                        report.failed += 1;
                    }
                }
            }

            if delivered {
                if let Err(e) = self.maintenances.mark_reminded(reminder.maintenance.id, now).await {
                    tracing::warn!(
                        maintenance_id = %reminder.maintenance.id,
                        error = %e,
                        "Could not mark maintenance as reminded"
                    );
                }
            }
        }

        tracing::info!(
            considered = report.considered,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "Maintenance reminder run finished"
        );
        Ok(report)
    }
}
