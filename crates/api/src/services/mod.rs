//! Startup and delivery services owned by the binary.

pub mod admin_bootstrap;
pub mod notification;

pub use admin_bootstrap::bootstrap_admin;
pub use notification::ConsoleNotificationService;
