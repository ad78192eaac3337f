//! Retry policy for network operations and classification of HTTP failures.

use reqwest::StatusCode;

/// Maximum number of attempts for a network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// HTTP failures that will not succeed on a second attempt.
#[derive(Debug, thiserror::Error)]
pub enum NonRetryableError {
    #[error("rate limited by server: {0}; try again later")]
    RateLimitExceeded(String),

    #[error("authentication failed: {0}; check the username and token")]
    AuthenticationFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("access forbidden: {0}; the account may not own the game")]
    Forbidden(String),

    #[error("request rejected: {0}")]
    ClientError(String),
}

/// Classifies a status error.
/// Returns Ok(()) if the request may be retried, otherwise the reason it may not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        // connection failures and timeouts
        return Ok(());
    };

    let url = error
        .url()
        .map(|u| u.path().to_string())
        .unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(url)),
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(url)),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded(url)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(format!(
            "HTTP {} for {}",
            s.as_u16(),
            url
        ))),
        _ => Ok(()),
    }
}

/// Maps an `error_for_status()` failure to an anyhow error, keeping the
/// reqwest error when it is retryable.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
