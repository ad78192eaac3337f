//! HTTP transport shared by the portal, auth and matchmaking clients.

mod client;
mod retry;

pub use client::{HttpClient, ProgressFn};
pub use retry::{NonRetryableError, check_retryable};

use crate::error::ModError;

/// Converts a transport failure into the crate error, turning a 404 into
/// `PackageNotFound` for `package`.
pub fn into_mod_error(err: anyhow::Error, package: &str) -> ModError {
    match err.downcast_ref::<NonRetryableError>() {
        Some(NonRetryableError::NotFound(_)) => ModError::package_not_found(package),
        _ => ModError::Transport(err),
    }
}
