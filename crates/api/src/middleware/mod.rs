//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::LoginRateLimiter;
pub use request_id::{request_id, REQUEST_ID_HEADER};
