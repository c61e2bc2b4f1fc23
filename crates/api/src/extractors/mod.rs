//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{AuthSession, TENANT_HEADER};
pub use pagination::PageQuery;
