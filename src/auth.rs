//! Account authentication.
//!
//! A session is a username plus a service token. It can be supplied directly
//! or obtained by exchanging a password with the auth server.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::error::ModError;
use crate::http::HttpClient;

pub const DEFAULT_AUTH_URL: &str = "https://auth.factorio.com";

/// Authentication input as collected from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub token: Option<String>,
    pub password: Option<String>,
    /// Ask the auth server to verify that the account owns the game
    pub require_ownership: bool,
}

/// An authenticated account.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

impl Session {
    /// Query parameters that authorize downloads and matchmaking requests.
    pub fn query(&self) -> [(&str, &str); 2] {
        [
            ("username", self.username.as_str()),
            ("token", self.token.as_str()),
        ]
    }
}

/// Build a session from `credentials`.
///
/// A username with a token is used as is. A username with a password is
/// exchanged at `<auth_url>/api-login`. Anything else fails with
/// `ModError::InsufficientCredentials`.
#[tracing::instrument(skip(http_client, credentials))]
pub async fn authenticate(
    http_client: &HttpClient,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<Session> {
    let Some(username) = credentials.username.as_deref().filter(|u| !u.is_empty()) else {
        return Err(ModError::InsufficientCredentials("a username is required".into()).into());
    };

    if let Some(token) = credentials.token.as_deref().filter(|t| !t.is_empty()) {
        debug!("Using provided token for {}", username);
        return Ok(Session {
            username: username.to_string(),
            token: token.to_string(),
        });
    }

    let Some(password) = credentials.password.as_deref().filter(|p| !p.is_empty()) else {
        return Err(ModError::InsufficientCredentials(
            "either a token or a password is required".into(),
        )
        .into());
    };

    let url = format!("{}/api-login", auth_url.trim_end_matches('/'));
    let require_ownership = credentials.require_ownership.to_string();
    let tokens: Vec<String> = http_client
        .post_form_json(
            &url,
            &[
                ("username", username),
                ("password", password),
                ("require_ownership", &require_ownership),
            ],
        )
        .await
        .context("Login failed")?;

    let token = tokens
        .into_iter()
        .next()
        .context("Login response did not contain a token")?;

    info!("Logged in as {}", username);
    Ok(Session {
        username: username.to_string(),
        token,
    })
}
