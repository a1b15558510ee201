//! The `/lyrics` proxy.
//!
//! Searches go to the Spotify catalog with the caller's bearer token (or the
//! app token when the caller sent none); lyrics lookups go to LRCLIB.

pub mod error;
pub mod routes;

use crate::auth::client_credentials::ClientCredentials;
use crate::config::ServerConfig;
use crate::lyrics::lrclib::LrclibClient;
use crate::spotify::SpotifyCatalog;
use anyhow::Context;
use axum::{Router, routing::get};
use std::sync::Arc;

struct Inner {
    catalog: SpotifyCatalog,
    lrclib: LrclibClient,
    app_token: Option<ClientCredentials>,
    require_auth_for_lyrics: bool,
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ProxyState {
    inner: Arc<Inner>,
}

impl ProxyState {
    pub fn new(
        catalog: SpotifyCatalog,
        lrclib: LrclibClient,
        app_token: Option<ClientCredentials>,
        require_auth_for_lyrics: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                lrclib,
                app_token,
                require_auth_for_lyrics,
            }),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let catalog = SpotifyCatalog::new(&cfg.spotify_api_url)?;
        let lrclib = LrclibClient::new(&cfg.lrclib_url)?;
        let app_token = match cfg.app_credentials() {
            Some((id, secret)) => Some(ClientCredentials::new(&cfg.spotify_token_url, id, secret)?),
            None => {
                tracing::warn!("no app credentials, searches without a bearer token will get 401");
                None
            }
        };
        Ok(Self::new(catalog, lrclib, app_token, cfg.require_auth_for_lyrics))
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/lyrics", get(routes::lyrics))
        .route("/health", get(routes::health))
        .with_state(state)
}

pub async fn serve(cfg: &ServerConfig) -> anyhow::Result<()> {
    let state = ProxyState::from_config(cfg)?;
    let listener = tokio::net::TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("bind {}", cfg.bind))?;
    tracing::info!(addr = %cfg.bind, "proxy listening");
    axum::serve(listener, router(state)).await.context("serve")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn state_for(spotify: &MockServer, lrclib: &MockServer, app: bool, require_auth: bool) -> ProxyState {
        let app_token = app.then(|| {
            ClientCredentials::new(format!("{}/api/token", spotify.uri()), "id", "secret").unwrap()
        });
        ProxyState::new(
            SpotifyCatalog::new(spotify.uri()).unwrap(),
            LrclibClient::new(lrclib.uri()).unwrap(),
            app_token,
            require_auth,
        )
    }

    async fn call(state: ProxyState, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = bearer {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let response = router(state)
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn spotify_search_body() -> Value {
        json!({
            "tracks": { "items": [{
                "id": "abc",
                "name": "Hey Jude",
                "artists": [{"name": "The Beatles"}],
                "album": {"name": "Hey Jude", "images": [{"url": "https://img/64", "width": 64, "height": 64}]},
                "duration_ms": 431333,
                "preview_url": null
            }]}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        let (status, body) = call(state_for(&spotify, &lrclib, false, false).await, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_search_forwards_caller_token() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "hey jude"))
            .and(header("authorization", "Bearer user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(spotify_search_body()))
            .mount(&spotify)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state, "/lyrics?query=hey%20jude", Some("user")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["title"], "Hey Jude");
        assert_eq!(body["results"][0]["durationMs"], 431333);
        assert_eq!(body["results"][0]["thumbnail"], "https://img/64");
    }

    #[tokio::test]
    async fn test_rejected_caller_token_is_401() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&spotify)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state, "/lyrics?query=x", Some("stale")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_search_without_any_token_is_401() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, _) = call(state, "/lyrics?query=x", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_app_token_retries_once_after_401() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "app", "token_type": "Bearer", "expires_in": 3600})),
            )
            .expect(2)
            .mount(&spotify)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&spotify)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(spotify_search_body()))
            .mount(&spotify)
            .await;

        let state = state_for(&spotify, &lrclib, true, false).await;
        let (status, body) = call(state, "/lyrics?query=hey", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_502() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&spotify)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state, "/lyrics?query=x", Some("user")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to search tracks");
    }

    #[tokio::test]
    async fn test_lyrics_found() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("track_name", "Hey Jude"))
            .and(query_param("artist_name", "The Beatles"))
            .and(query_param("album_name", "Hey Jude"))
            .and(query_param("duration", "431"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "trackName": "Hey Jude", "artistName": "The Beatles",
                "instrumental": false, "plainLyrics": "Hey Jude\n\nDon't make it bad", "syncedLyrics": null
            })))
            .mount(&lrclib)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(
            state,
            "/lyrics?trackName=Hey%20Jude&artistName=The%20Beatles&albumName=Hey%20Jude&duration=431333",
            Some("user"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lyrics"], "Hey Jude\n\nDon't make it bad");
        assert_eq!(body["source"], "LRCLIB");
        assert_eq!(body["isSynced"], false);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_provider_404_is_not_found_body() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&lrclib)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state, "/lyrics?trackName=x&artistName=y&duration=1000", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"lyrics": null, "source": "LRCLIB", "isSynced": false, "message": "No lyrics found."})
        );
    }

    #[tokio::test]
    async fn test_huge_duration_is_clamped() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("duration", "18446744073709551"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&lrclib)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(
            state,
            "/lyrics?trackName=a&artistName=b&duration=18446744073709551615",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["lyrics"].is_null());
    }

    #[tokio::test]
    async fn test_lrclib_failure_is_502() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&lrclib)
            .await;

        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state, "/lyrics?trackName=x&artistName=y", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to fetch lyrics");
    }

    #[tokio::test]
    async fn test_lyrics_can_require_auth() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        let state = state_for(&spotify, &lrclib, false, true).await;
        let (status, _) = call(state, "/lyrics?trackName=x&artistName=y", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_params_is_400() {
        let (spotify, lrclib) = (MockServer::start().await, MockServer::start().await);
        let state = state_for(&spotify, &lrclib, false, false).await;
        let (status, body) = call(state.clone(), "/lyrics?trackName=x", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = call(state, "/lyrics?trackName=x&artistName=y&duration=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
