//! Creates the protected super-administrator on first start.

use domain::services::PrincipalService;
use domain::DomainResult;
use tracing::{info, warn};

use crate::config::AdminConfig;

/// Idempotent: does nothing when bootstrap is not configured or the username
/// is already taken. Returns whether a principal was created.
pub async fn bootstrap_admin(
    principals: &PrincipalService,
    config: &AdminConfig,
) -> DomainResult<bool> {
    let Some((username, password)) = config.bootstrap_credentials() else {
        if config.bootstrap_username.is_some() {
            warn!("admin.bootstrap_username is set without a password, skipping bootstrap");
        }
        return Ok(false);
    };

    let email = config
        .bootstrap_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let created = principals.bootstrap_root(username, password, email).await?;
    if created {
        info!(username = %username, "Bootstrap super-administrator created");
    } else {
        info!(username = %username, "Bootstrap super-administrator already exists");
    }
    Ok(created)
}
