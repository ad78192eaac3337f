//! HTTP client with built-in retry logic and error handling.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable};

/// Callback receiving download progress as a fraction in `0.0..=1.0`.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {}...", url);

        self.with_retry("GET JSON", || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .context("Failed to send request")?;

            let response = response.error_for_status().map_err(check_retryable)?;

            let result = response
                .json::<T>()
                .await
                .context("Failed to parse JSON response")?;

            Ok(result)
        })
        .await
    }

    /// Performs a form-encoded POST and deserializes the JSON response.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        debug!("POST form to {}...", url);

        self.with_retry("POST form", || async {
            let response = self
                .client
                .post(url)
                .form(form)
                .send()
                .await
                .context("Failed to send request")?;

            let response = response.error_for_status().map_err(check_retryable)?;

            response
                .json::<T>()
                .await
                .context("Failed to parse JSON response")
        })
        .await
    }

    /// Downloads the body of a URL into memory.
    /// Automatically retries on transient errors.
    ///
    /// `on_progress` receives the fraction downloaded so far whenever the
    /// server announced a content length.
    #[tracing::instrument(skip(self, query, on_progress))]
    pub async fn download_bytes(
        &self,
        url: &str,
        query: &[(&str, &str)],
        on_progress: ProgressFn<'_>,
    ) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);

        self.with_retry("Download", || self.download_once(url, query, on_progress))
            .await
    }

    /// Single download attempt without retry.
    async fn download_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
        on_progress: ProgressFn<'_>,
    ) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response.error_for_status().map_err(check_retryable)?;

        let total = response.content_length().filter(|len| *len > 0);
        let mut body = Vec::with_capacity(total.unwrap_or_default() as usize);

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            body.extend_from_slice(&chunk);
            if let Some(total) = total {
                on_progress((body.len() as f64 / total as f64).min(1.0));
            }
        }

        debug!(
            "Downloaded {:.2} MB",
            body.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(body)
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < MAX_RETRIES {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name, attempt, MAX_RETRIES, e, RETRY_DELAY_MS
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, MAX_RETRIES)
        }))
    }
}

/// Checks if an anyhow::Error is retryable based on its content.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
