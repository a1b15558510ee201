use super::ProxyState;
use super::error::ProxyError;
use crate::api::models::{LyricsQuery, LyricsResponse, SearchResponse, Track};
use crate::auth::BearerToken;
use crate::lyrics::lrclib::{LrclibClient, duration_secs};
use crate::spotify::SpotifyError;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::Serialize;

const NOT_FOUND_MESSAGE: &str = "No lyrics found.";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /lyrics
///
/// `?query=` searches the catalog; `?trackName=&artistName=` looks up lyrics.
pub async fn lyrics(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    query: Result<Query<LyricsQuery>, QueryRejection>,
) -> Result<Response, ProxyError> {
    let Query(q) = query.map_err(|e| ProxyError::BadRequest(e.body_text()))?;
    let bearer = bearer_token(&headers);

    if let Some(text) = non_empty(q.query.as_deref()) {
        let results = search(&state, bearer.as_ref(), text).await?;
        return Ok(Json(SearchResponse { results }).into_response());
    }

    let (Some(track), Some(artist)) = (non_empty(q.track_name.as_deref()), non_empty(q.artist_name.as_deref()))
    else {
        return Err(ProxyError::BadRequest(
            "Provide either query, or trackName and artistName".to_string(),
        ));
    };

    if state.inner.require_auth_for_lyrics && bearer.is_none() {
        return Err(ProxyError::Unauthorized("Missing bearer token".to_string()));
    }

    let album = non_empty(q.album_name.as_deref());
    let lyrics = state
        .inner
        .lrclib
        .get_plain_lyrics(track, artist, album, q.duration.map(duration_secs))
        .await
        .map_err(|e| ProxyError::upstream("Failed to fetch lyrics", format!("{e:#}")))?;

    tracing::info!(track, artist, found = lyrics.is_some(), "lyrics lookup");
    let message = lyrics.is_none().then(|| NOT_FOUND_MESSAGE.to_string());
    Ok(Json(LyricsResponse {
        lyrics,
        source: LrclibClient::SOURCE_NAME.to_string(),
        is_synced: false,
        message,
    })
    .into_response())
}

async fn search(state: &ProxyState, bearer: Option<&BearerToken>, query: &str) -> Result<Vec<Track>, ProxyError> {
    let catalog = &state.inner.catalog;

    if let Some(token) = bearer {
        return catalog.search_tracks(token, query).await.map_err(search_error);
    }

    let Some(app) = state.inner.app_token.as_ref() else {
        return Err(ProxyError::Unauthorized("Missing bearer token".to_string()));
    };

    let token = app
        .token()
        .await
        .map_err(|e| ProxyError::upstream("Failed to search tracks", e))?;
    match catalog.search_tracks(&token, query).await {
        Err(SpotifyError::Unauthorized) => {
            tracing::info!("app token rejected, renewing once");
            app.invalidate().await;
            let token = app
                .token()
                .await
                .map_err(|e| ProxyError::upstream("Failed to search tracks", e))?;
            catalog
                .search_tracks(&token, query)
                .await
                .map_err(|e| ProxyError::upstream("Failed to search tracks", e))
        }
        other => other.map_err(search_error),
    }
}

fn search_error(e: SpotifyError) -> ProxyError {
    match e {
        SpotifyError::Unauthorized => ProxyError::Unauthorized("Invalid or expired token".to_string()),
        other => ProxyError::upstream("Failed to search tracks", other),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| BearerToken::new(token))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some(BearerToken::new("abc")));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(bearer_token(&headers), Some(BearerToken::new("xyz")));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
