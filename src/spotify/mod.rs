//! Spotify Web API catalog search (server side).

pub mod models;

use crate::api::models::Track;
use crate::auth::BearerToken;
use anyhow::Context;
use std::sync::Arc;
use thiserror::Error;

/// Results per search request.
pub const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify rejected the access token")]
    Unauthorized,
    #[error("Spotify returned {0}")]
    Status(u16),
    #[error("Spotify request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    inner: Arc<Inner>,
}

impl SpotifyCatalog {
    pub const DEFAULT_API_URL: &'static str = "https://api.spotify.com";

    pub fn new(api_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                api_url: api_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Track search, capped at [`SEARCH_LIMIT`] results.
    pub async fn search_tracks(
        &self,
        token: &BearerToken,
        query: &str,
    ) -> Result<Vec<Track>, SpotifyError> {
        let url = format!(
            "{}/v1/search?q={}&type=track&limit={}",
            self.inner.api_url,
            urlencoding::encode(query),
            SEARCH_LIMIT
        );

        let response = self
            .inner
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), query, "spotify search failed");
            return Err(SpotifyError::Status(status.as_u16()));
        }

        let envelope: models::SearchEnvelope = response.json().await?;
        let tracks: Vec<Track> = envelope.tracks.items.into_iter().map(Track::from).collect();
        tracing::debug!(query, count = tracks.len(), "spotify search");
        Ok(tracks)
    }
}
