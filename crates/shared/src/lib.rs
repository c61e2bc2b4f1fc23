//! Shared utilities and common types for the asset manager backend.
//!
//! This crate provides functionality used across all other crates:
//! - Text normalization for case and accent insensitive matching
//! - Offset pagination parameters
//! - Password hashing with Argon2id
//! - JWT access tokens
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod text;
pub mod validation;
