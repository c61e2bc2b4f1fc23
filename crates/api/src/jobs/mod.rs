//! Background job scheduler and job implementations.

mod login_limiter_cleanup;
mod maintenance_reminders;
mod pool_metrics;
mod scheduler;

pub use login_limiter_cleanup::LoginLimiterCleanupJob;
pub use maintenance_reminders::MaintenanceReminderJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
