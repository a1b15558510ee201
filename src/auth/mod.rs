//! Bearer credentials
//!
//! - `Credential`: the user's token, owned by whoever drives the UI
//! - `implicit`: building the authorize URL and reading the redirect back
//! - `client_credentials`: the proxy's self-renewing app token

pub mod client_credentials;
pub mod implicit;

use std::fmt;

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// The user's credential. There is exactly one owner; every API call
/// borrows the token from it, and only the owner sets or clears it.
///
/// `generation` is bumped on every change so responses issued under an older
/// token can be told apart from responses for the current one.
#[derive(Debug, Default)]
pub struct Credential {
    token: Option<BearerToken>,
    generation: u64,
}

impl Credential {
    pub fn new(token: Option<BearerToken>) -> Self {
        Self { token, generation: 0 }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set(&mut self, token: BearerToken) {
        self.token = Some(token);
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        if self.token.take().is_some() {
            self.generation += 1;
        }
    }

    /// Clear only if the failing request was issued under the current token.
    /// Returns true when the credential was cleared.
    pub fn expire(&mut self, issued_under: u64) -> bool {
        if issued_under != self.generation || self.token.is_none() {
            return false;
        }
        self.clear();
        true
    }
}
