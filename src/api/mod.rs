//! Client for the lyricsnap proxy (`GET /lyrics`).
//!
//! Every failure is turned into an [`ApiError`] here; UI code only ever sees
//! [`ApiError::user_message`].

pub mod models;

use crate::auth::BearerToken;
use crate::lyrics::LyricsDocument;
use anyhow::Context;
use models::{ErrorBody, LyricsResponse, SearchResponse, Track};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in")]
    AuthRequired,
    #[error("Session expired")]
    AuthExpired,
    #[error("{0}")]
    Upstream(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::AuthRequired | ApiError::AuthExpired)
    }

    /// Single human-readable line for banners and toasts.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::AuthRequired => "Please log in first.".to_string(),
            ApiError::AuthExpired => "Your session expired. Please log in again.".to_string(),
            ApiError::Upstream(msg) => format!("{}. Please try again.", msg.trim_end_matches('.')),
            ApiError::Transport(e) if e.is_timeout() => {
                "The lyrics service took too long to answer. Please try again.".to_string()
            }
            ApiError::Transport(_) => {
                "Could not reach the lyrics service. Please try again.".to_string()
            }
            ApiError::Decode(_) => "The lyrics service sent an unexpected answer.".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum LyricsOutcome {
    Found(LyricsDocument),
    /// A valid answer: the provider has no lyrics for this track.
    NotFound { message: String },
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    pub async fn search(&self, token: &BearerToken, query: &str) -> Result<Vec<Track>, ApiError> {
        let url = format!(
            "{}/lyrics?query={}",
            self.inner.base_url,
            urlencoding::encode(query)
        );
        let body: SearchResponse = self.get_json(token, &url).await?;
        tracing::debug!(query, count = body.results.len(), "search results");
        Ok(body.results)
    }

    pub async fn lyrics(&self, token: &BearerToken, track: &Track) -> Result<LyricsOutcome, ApiError> {
        let url = format!(
            "{}/lyrics?trackName={}&artistName={}&albumName={}&duration={}",
            self.inner.base_url,
            urlencoding::encode(&track.title),
            urlencoding::encode(&track.artist),
            urlencoding::encode(&track.album),
            track.duration_ms
        );
        let body: LyricsResponse = self.get_json(token, &url).await?;
        match body.lyrics {
            Some(text) => Ok(LyricsOutcome::Found(LyricsDocument::parse(
                &text,
                body.source,
                body.is_synced,
            ))),
            None => Ok(LyricsOutcome::NotFound {
                message: body.message.unwrap_or_else(|| "No lyrics found.".to_string()),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &BearerToken, url: &str) -> Result<T, ApiError> {
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("proxy answered 401");
            return Err(ApiError::AuthExpired);
        }

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("The lyrics service returned {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %message, "proxy error");
            return Err(ApiError::Upstream(message));
        }

        if let Ok(err) = serde_json::from_slice::<ErrorBody>(&bytes) {
            return Err(ApiError::Upstream(err.error));
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn track() -> Track {
        Track {
            id: "t1".into(),
            title: "Hey Jude".into(),
            artist: "The Beatles".into(),
            album: "Hey Jude".into(),
            duration_ms: 431_333,
            thumbnail: None,
            preview_url: None,
        }
    }

    fn token() -> BearerToken {
        BearerToken::new("user-token")
    }

    #[tokio::test]
    async fn test_search_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .and(query_param("query", "hey jude"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "id": "t1", "title": "Hey Jude", "artist": "The Beatles",
                    "album": "Hey Jude", "durationMs": 431333
                }]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        let results = api.search(&token(), "hey jude").await.unwrap();
        assert_eq!(results, vec![track()]);
    }

    #[tokio::test]
    async fn test_empty_search_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        assert!(api.search(&token(), "zzzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_401_is_auth_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "expired" })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        let err = api.lyrics(&token(), &track()).await.err().unwrap();
        assert!(matches!(err, ApiError::AuthExpired));
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_lyrics_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .and(query_param("trackName", "Hey Jude"))
            .and(query_param("artistName", "The Beatles"))
            .and(query_param("albumName", "Hey Jude"))
            .and(query_param("duration", "431333"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lyrics": "Hey Jude\n\nDon't make it bad",
                "source": "LRCLIB",
                "isSynced": false
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        match api.lyrics(&token(), &track()).await.unwrap() {
            LyricsOutcome::Found(doc) => {
                assert_eq!(doc.lines, vec!["Hey Jude", "", "Don't make it bad"]);
                assert_eq!(doc.source, "LRCLIB");
                assert!(!doc.synced);
            }
            LyricsOutcome::NotFound { .. } => panic!("expected lyrics"),
        }
    }

    #[tokio::test]
    async fn test_lyrics_without_source_still_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lyrics": "a\nb",
                "isSynced": false
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        match api.lyrics(&token(), &track()).await.unwrap() {
            LyricsOutcome::Found(doc) => {
                assert_eq!(doc.lines, vec!["a", "b"]);
                assert!(doc.source.is_empty());
            }
            LyricsOutcome::NotFound { .. } => panic!("expected lyrics"),
        }
    }

    #[tokio::test]
    async fn test_lyrics_not_found_is_informational() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lyrics": null,
                "source": "LRCLIB",
                "isSynced": false,
                "message": "No lyrics found."
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        match api.lyrics(&token(), &track()).await.unwrap() {
            LyricsOutcome::NotFound { message } => assert_eq!(message, "No lyrics found."),
            LyricsOutcome::Found(_) => panic!("expected not found"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_message_is_normalised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({ "error": "Failed to fetch lyrics" })),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        let err = api.lyrics(&token(), &track()).await.err().unwrap();
        assert_eq!(err.user_message(), "Failed to fetch lyrics. Please try again.");
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyrics"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri()).unwrap();
        let err = api.search(&token(), "x").await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Nothing listens on port 9 on the loopback interface.
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = api.search(&token(), "x").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.user_message().is_empty());
    }
}
