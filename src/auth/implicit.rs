//! Implicit-grant login
//!
//! The provider redirects back to `redirect_uri#access_token=...&state=...`
//! (or `#error=...`). The fragment is parsed and then stripped so the token
//! does not stay visible in the address.

use super::BearerToken;
use crate::config::AuthConfig;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid redirect URL: {0}")]
    InvalidUrl(String),
    #[error("Authorization failed: {0}")]
    Denied(String),
    #[error("Redirect did not contain an access token")]
    MissingToken,
    #[error("Authorization state mismatch, start the login again")]
    StateMismatch,
    #[error("No client_id configured (set [auth].client_id in the config file)")]
    MissingClientId,
}

/// A pending authorization: the URL to open and the state value it carries.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub url: String,
    pub state: String,
}

impl AuthorizeRequest {
    pub fn new(cfg: &AuthConfig) -> Result<Self, AuthError> {
        if cfg.client_id.trim().is_empty() {
            return Err(AuthError::MissingClientId);
        }
        let state = format!("{:016x}", rand::random::<u64>());
        let mut url =
            Url::parse(&cfg.authorize_url).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &cfg.client_id)
            .append_pair("response_type", "token")
            .append_pair("redirect_uri", &cfg.redirect_uri)
            .append_pair("scope", &cfg.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("show_dialog", "true");
        Ok(Self {
            url: url.into(),
            state,
        })
    }

    /// Parse the redirect-back URL and check it belongs to this request.
    pub fn complete(&self, redirect: &str) -> Result<AuthCallback, AuthError> {
        let cb = parse_redirect(redirect)?;
        if cb.state.as_deref() != Some(self.state.as_str()) {
            return Err(AuthError::StateMismatch);
        }
        Ok(cb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCallback {
    pub token: BearerToken,
    pub expires_in: Option<u64>,
    pub state: Option<String>,
    /// The redirect URL with the fragment removed.
    pub clean_url: String,
}

pub fn parse_redirect(redirect: &str) -> Result<AuthCallback, AuthError> {
    let url = Url::parse(redirect.trim()).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

    let fragment_pairs: Vec<(String, String)> = url
        .fragment()
        .map(|f| {
            url::form_urlencoded::parse(f.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let lookup = |key: &str| {
        fragment_pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| {
                url.query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
            })
    };

    if let Some(error) = lookup("error") {
        return Err(AuthError::Denied(error));
    }

    let token = lookup("access_token")
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    Ok(AuthCallback {
        token: BearerToken::new(token),
        expires_in: lookup("expires_in").and_then(|v| v.parse().ok()),
        state: lookup("state"),
        clean_url: strip_fragment(&url),
    })
}

fn strip_fragment(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_cfg() -> AuthConfig {
        AuthConfig {
            client_id: "abc123".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_authorize_url_carries_parameters() {
        let req = AuthorizeRequest::new(&auth_cfg()).unwrap();
        let url = Url::parse(&req.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "abc123".into())));
        assert!(pairs.contains(&("response_type".into(), "token".into())));
        assert!(pairs.contains(&("state".into(), req.state.clone())));
    }

    #[test]
    fn test_missing_client_id() {
        let err = AuthorizeRequest::new(&AuthConfig::default()).unwrap_err();
        assert_eq!(err, AuthError::MissingClientId);
    }

    #[test]
    fn test_parse_token_and_strip_fragment() {
        let cb = parse_redirect(
            "http://127.0.0.1:8787/callback#access_token=tok%2Bx&token_type=Bearer&expires_in=3600",
        )
        .unwrap();
        assert_eq!(cb.token.as_str(), "tok+x");
        assert_eq!(cb.expires_in, Some(3600));
        assert_eq!(cb.clean_url, "http://127.0.0.1:8787/callback");
    }

    #[test]
    fn test_parse_error_code() {
        let err = parse_redirect("http://localhost/callback#error=access_denied").unwrap_err();
        assert_eq!(err, AuthError::Denied("access_denied".into()));
    }

    #[test]
    fn test_missing_token() {
        let err = parse_redirect("http://localhost/callback").unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[test]
    fn test_state_mismatch_rejected() {
        let req = AuthorizeRequest::new(&auth_cfg()).unwrap();
        let err = req
            .complete("http://localhost/callback#access_token=t&state=forged")
            .unwrap_err();
        assert_eq!(err, AuthError::StateMismatch);

        let missing = req
            .complete("http://127.0.0.1:8888/callback#access_token=forged&token_type=Bearer")
            .unwrap_err();
        assert_eq!(missing, AuthError::StateMismatch);

        let ok = req
            .complete(&format!("http://localhost/callback#access_token=t&state={}", req.state))
            .unwrap();
        assert_eq!(ok.token.as_str(), "t");
    }
}
