//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API. Only the exact-match `get` endpoint is used;
//! a 404 from it means "no lyrics", not an error.
//! API Documentation: https://lrclib.net/docs

use anyhow::Context;
use serde::Deserialize;

/// LRCLIB API response
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LrclibResponse {
    #[allow(dead_code)]
    id: i64,
    #[allow(dead_code)]
    track_name: String,
    #[allow(dead_code)]
    artist_name: String,
    #[serde(default)]
    instrumental: bool,
    plain_lyrics: Option<String>,
    #[allow(dead_code)]
    synced_lyrics: Option<String>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    pub const SOURCE_NAME: &'static str = "LRCLIB";
    const USER_AGENT: &'static str = concat!("lyricsnap/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .context("build reqwest client")?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Plain lyrics for an exact track match. `Ok(None)` when LRCLIB has no
    /// record, or the record carries no plain text.
    pub async fn get_plain_lyrics(
        &self,
        track_name: &str,
        artist_name: &str,
        album_name: Option<&str>,
        duration_secs: Option<u64>,
    ) -> anyhow::Result<Option<String>> {
        let mut url = format!(
            "{}/get?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(track_name),
            urlencoding::encode(artist_name)
        );

        if let Some(album) = album_name.filter(|a| !a.is_empty()) {
            url.push_str(&format!("&album_name={}", urlencoding::encode(album)));
        }

        if let Some(duration) = duration_secs {
            url.push_str(&format!("&duration={}", duration));
        }

        tracing::debug!(track = track_name, artist = artist_name, "lrclib lookup");
        let response = self.client.get(&url).send().await.context("send lrclib request")?;

        if response.status().is_success() {
            let lyrics: LrclibResponse = response.json().await.context("parse lrclib json")?;
            if lyrics.instrumental {
                return Ok(None);
            }
            Ok(lyrics.plain_lyrics.filter(|p| !p.trim().is_empty()))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB API error: {}", response.status());
        }
    }
}

/// Milliseconds to whole seconds, rounding half up.
pub fn duration_secs(duration_ms: u64) -> u64 {
    duration_ms.saturating_add(500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_duration_rounding() {
        assert_eq!(duration_secs(0), 0);
        assert_eq!(duration_secs(1_499), 1);
        assert_eq!(duration_secs(1_500), 2);
        assert_eq!(duration_secs(215_733), 216);
        assert_eq!(duration_secs(u64::MAX), u64::MAX / 1000);
    }

    #[tokio::test]
    async fn test_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("track_name", "Hey Jude"))
            .and(query_param("artist_name", "The Beatles"))
            .and(query_param("duration", "431"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "trackName": "Hey Jude",
                "artistName": "The Beatles",
                "albumName": "Hey Jude",
                "duration": 431.0,
                "instrumental": false,
                "plainLyrics": "Hey Jude, don't make it bad\n\nTake a sad song",
                "syncedLyrics": null
            })))
            .mount(&server)
            .await;

        let client = LrclibClient::new(server.uri()).unwrap();
        let lyrics = client
            .get_plain_lyrics("Hey Jude", "The Beatles", Some("Hey Jude"), Some(431))
            .await
            .unwrap();
        assert_eq!(lyrics.as_deref(), Some("Hey Jude, don't make it bad\n\nTake a sad song"));
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 404, "name": "TrackNotFound", "message": "Failed to find specified track"
            })))
            .mount(&server)
            .await;

        let client = LrclibClient::new(server.uri()).unwrap();
        let lyrics = client.get_plain_lyrics("x", "y", None, None).await.unwrap();
        assert!(lyrics.is_none());
    }

    #[tokio::test]
    async fn test_instrumental_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2, "trackName": "Intro", "artistName": "Band",
                "instrumental": true, "plainLyrics": null, "syncedLyrics": null
            })))
            .mount(&server)
            .await;

        let client = LrclibClient::new(server.uri()).unwrap();
        assert!(client.get_plain_lyrics("Intro", "Band", None, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = LrclibClient::new(server.uri()).unwrap();
        assert!(client.get_plain_lyrics("x", "y", None, None).await.is_err());
    }
}
