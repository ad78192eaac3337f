//! Service factory for building command dependencies.
//!
//! Clients are built from configuration values but are not part of the
//! configuration itself.

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use reqwest::Client;

use crate::{
    auth::{Session, authenticate},
    config::Config,
    download::HttpDownloader,
    http::HttpClient,
    matchmaking::Matchmaking,
    portal::FactorioPortal,
};

/// Build the HTTP client shared by every remote service
pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(concat!("modportal-cli/", env!("MODPORTAL_VERSION")))
        .build()?;
    Ok(HttpClient::new(client))
}

pub fn build_portal(config: &Config, http_client: &HttpClient) -> FactorioPortal {
    FactorioPortal::new(http_client.clone(), &config.portal_url)
}

pub fn build_matchmaking(config: &Config, http_client: &HttpClient) -> Matchmaking {
    Matchmaking::new(http_client.clone(), &config.matchmaking_url)
}

/// Log in with the configured credentials.
///
/// Without a username there is no session; downloads then fail with
/// `InsufficientCredentials`. A login that is attempted and fails is an error.
pub async fn build_session(config: &Config, http_client: &HttpClient) -> Result<Option<Session>> {
    if config.credentials.username.is_none() {
        debug!("No username configured, continuing without a session");
        return Ok(None);
    }
    authenticate(http_client, &config.auth_url, &config.credentials)
        .await
        .map(Some)
}

/// Build a downloader that logs progress at debug level
pub fn build_downloader(
    config: &Config,
    http_client: &HttpClient,
    session: Option<Session>,
) -> HttpDownloader {
    HttpDownloader::new(http_client.clone(), &config.portal_url, session).with_progress(Arc::new(
        |reference, fraction| debug!("{}: {:.0}%", reference, fraction * 100.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::ConfigOverrides;
    use crate::runtime::MockRuntime;
    use mockito::{Matcher, Server};
    use std::path::PathBuf;

    fn config(username: Option<&str>, token: Option<&str>) -> Config {
        let overrides = ConfigOverrides {
            mod_dir: Some(PathBuf::from("/mods")),
            save_dir: Some(PathBuf::from("/saves")),
            credentials: Credentials {
                username: username.map(String::from),
                token: token.map(String::from),
                ..Default::default()
            },
            ..Default::default()
        };
        Config::load(&MockRuntime::new(), overrides).unwrap()
    }

    #[tokio::test]
    async fn test_build_http_client_sets_user_agent() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_header("User-Agent", Matcher::Regex("^modportal-cli/".to_string()))
            .create_async()
            .await;

        let http_client = build_http_client().unwrap();
        let _ = http_client.inner().get(server.url()).send().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_build_session_without_username() {
        let http_client = build_http_client().unwrap();
        let session = build_session(&config(None, Some("t0k")), &http_client)
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_build_session_with_token() {
        let http_client = build_http_client().unwrap();
        let session = build_session(&config(Some("player"), Some("t0k")), &http_client)
            .await
            .unwrap();
        assert_eq!(session.map(|s| s.token).as_deref(), Some("t0k"));
    }

    #[tokio::test]
    async fn test_build_session_username_only_fails() {
        let http_client = build_http_client().unwrap();
        let result = build_session(&config(Some("player"), None), &http_client).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_build_portal_uses_config_url() {
        let http_client = build_http_client().unwrap();
        let mut config = config(None, None);
        config.portal_url = "http://localhost:9/".into();

        assert_eq!(build_portal(&config, &http_client).base_url(), "http://localhost:9");
    }
}
