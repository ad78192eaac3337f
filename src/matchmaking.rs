//! Multiplayer matchmaking lookups. Responses are passed through as JSON.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::auth::Session;
use crate::http::HttpClient;

pub const DEFAULT_MATCHMAKING_URL: &str = "https://multiplayer.factorio.com";

pub struct Matchmaking {
    http_client: HttpClient,
    base_url: String,
}

impl Matchmaking {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// List public games. Requires a session.
    #[tracing::instrument(skip(self, session))]
    pub async fn games(&self, session: &Session) -> Result<Vec<Value>> {
        let url = format!("{}/get-games", self.base_url);
        self.http_client
            .get_json_with_query(&url, &session.query())
            .await
            .context("Failed to list games")
    }

    #[tracing::instrument(skip(self))]
    pub async fn game_details(&self, game_id: &str) -> Result<Value> {
        let url = format!("{}/get-game-details/{}", self.base_url, game_id);
        self.http_client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch details for game {}", game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::Client;

    #[tokio::test]
    async fn test_games_sends_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get-games")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "player".into()),
                Matcher::UrlEncoded("token".into(), "t0k".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"game_id": 42, "name": "Megabase"}]"#)
            .create_async()
            .await;

        let session = Session {
            username: "player".into(),
            token: "t0k".into(),
        };
        let games = Matchmaking::new(HttpClient::new(Client::new()), &server.url())
            .games(&session)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["name"], "Megabase");
    }

    #[tokio::test]
    async fn test_game_details() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/get-game-details/42")
            .with_status(200)
            .with_body(r#"{"game_id": 42, "mods": [{"name": "base"}]}"#)
            .create_async()
            .await;

        let details = Matchmaking::new(HttpClient::new(Client::new()), &server.url())
            .game_details("42")
            .await
            .unwrap();

        assert_eq!(details["game_id"], 42);
    }

    #[tokio::test]
    async fn test_game_details_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/get-game-details/7")
            .with_status(404)
            .create_async()
            .await;

        let err = Matchmaking::new(HttpClient::new(Client::new()), &server.url())
            .game_details("7")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("game 7"));
    }
}
