use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::auth::Session;
use crate::error::ModError;
use crate::http::{HttpClient, into_mod_error};

/// Callback for fractional download progress.
pub type ProgressCallback = Arc<dyn Fn(&str, f64) + Send + Sync>;

/// Fetches release files from a download reference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the file behind `reference` (a portal download locator)
    /// and return its bytes.
    async fn download(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Downloads from the portal using the session's username and token.
pub struct HttpDownloader {
    http_client: HttpClient,
    base_url: String,
    session: Option<Session>,
    on_progress: Option<ProgressCallback>,
}

impl HttpDownloader {
    pub fn new(http_client: HttpClient, base_url: &str, session: Option<Session>) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            on_progress: None,
        }
    }

    /// Report progress for every download as `(reference, fraction)`.
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    #[tracing::instrument(skip(self))]
    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        let Some(session) = &self.session else {
            return Err(ModError::InsufficientCredentials(
                "downloads require a username and token".into(),
            )
            .into());
        };

        let url = if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            format!("{}{}", self.base_url, reference)
        };
        info!("Downloading {}...", reference);

        let report = |fraction: f64| {
            if let Some(cb) = &self.on_progress {
                cb(reference, fraction);
            }
        };

        let bytes = self
            .http_client
            .download_bytes(&url, &session.query(), &report)
            .await
            .map_err(|e| into_mod_error(e, reference))?;

        info!("Download of {} complete.", reference);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::Client;
    use std::sync::Mutex;

    fn session() -> Session {
        Session {
            username: "player".into(),
            token: "t0k".into(),
        }
    }

    #[tokio::test]
    async fn test_download_appends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/download/Foreman/abc")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "player".into()),
                Matcher::UrlEncoded("token".into(), "t0k".into()),
            ]))
            .with_status(200)
            .with_body("zip bytes")
            .create_async()
            .await;

        let downloader =
            HttpDownloader::new(HttpClient::new(Client::new()), &server.url(), Some(session()));
        let bytes = downloader.download("/download/Foreman/abc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"zip bytes");
    }

    #[tokio::test]
    async fn test_download_reports_progress() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/download/a")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("0123456789")
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let downloader =
            HttpDownloader::new(HttpClient::new(Client::new()), &server.url(), Some(session()))
                .with_progress(Arc::new(move |reference, fraction| {
                    seen_clone
                        .lock()
                        .unwrap()
                        .push((reference.to_string(), fraction));
                }));

        downloader.download("/download/a").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&("/download/a".to_string(), 1.0)));
    }

    #[tokio::test]
    async fn test_download_without_session() {
        let downloader = HttpDownloader::new(HttpClient::new(Client::new()), "http://unused", None);

        let err = downloader.download("/download/a").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ModError>(),
            Some(ModError::InsufficientCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_download_failure_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/download/a")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let downloader =
            HttpDownloader::new(HttpClient::new(Client::new()), &server.url(), Some(session()));
        let err = downloader.download("/download/a").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ModError>(),
            Some(ModError::Transport(_))
        ));
    }
}
