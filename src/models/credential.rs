//! The bearer credential obtained from the OAuth2 token endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer token proving the caller's authority against the provider.
///
/// The expiry instant is only known right after a token exchange; when the
/// token is read back from the session cookie the server has no record of
/// it, so `expires_at` is `None` and validity is discovered lazily by the
/// first provider call that uses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Access token sent as `Authorization: Bearer ...`.
    pub access_token: String,

    /// When the token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a raw token with no known expiry (the
    /// cookie-read path).
    pub fn from_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_cookie_read_carries_no_expiry() {
        let cred = Credential::from_token("t");
        assert_eq!(cred.access_token, "t");
        assert!(cred.expires_at.is_none());
    }
}
