//! Domain layer for the hotel asset manager.
//!
//! This crate contains:
//! - Domain models (tenants, principals, devices, maintenances, ...)
//! - The error taxonomy shared by every layer
//! - Store ports implemented by the persistence crate, plus an in-memory store
//! - Business services: tenant scoping, access policy, device lifecycle,
//!   audit recording, bulk import and maintenance reminders

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{DomainError, DomainResult};
