//! Periodic maintenance reminder run.

use chrono::Utc;
use domain::services::ReminderService;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_reminders;

pub struct MaintenanceReminderJob {
    reminders: ReminderService,
    interval_minutes: u64,
}

impl MaintenanceReminderJob {
    pub fn new(reminders: ReminderService, interval_minutes: u64) -> Self {
        Self {
            reminders,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for MaintenanceReminderJob {
    fn name(&self) -> &'static str {
        "maintenance_reminders"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let report = self
            .reminders
            .run(Utc::now())
            .await
            .map_err(|e| e.to_string())?;
        record_reminders(&report);

        info!(
            considered = report.considered,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "Maintenance reminders processed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::{MockNotificationService, ServiceSettings, Services};
    use domain::store::Stores;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_job_runs_against_empty_store() {
        let services = Services::new(
            Stores::in_memory(),
            Arc::new(MockNotificationService::new()),
            ServiceSettings::default(),
        );
        let job = MaintenanceReminderJob::new(services.reminders, 30);

        assert_eq!(job.frequency(), JobFrequency::Minutes(30));
        assert!(job.execute().await.is_ok());
    }
}
