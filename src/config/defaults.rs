use super::Config;

pub const PROXY_BASE_URL: &str = "http://127.0.0.1:8787";
pub const SERVER_BIND: &str = "127.0.0.1:8787";
pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8787/callback";
pub const SCOPES: &[&str] = &["user-read-private", "user-read-email"];

/// Config written on first run.
pub fn defaults() -> Config {
    Config::default()
}
