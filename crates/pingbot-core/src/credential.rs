//! Bearer credential storage and expiry handling.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Validity of tokens obtained from the platform's token issuance page.
const TOKEN_VALIDITY_DAYS: i64 = 365;

/// A long-lived bearer credential for the platform's REST API.
///
/// Owned by the process for its entire lifetime; there is no refresh or
/// rotation. Once `expires_at` passes, new requests fail terminally rather
/// than being retried.
#[derive(Clone)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential with an explicit expiry.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Create a credential issued now, valid for one year.
    #[must_use]
    pub fn issued_now(token: impl Into<String>) -> Self {
        let expires_at = Utc::now()
            .checked_add_signed(Duration::days(TOKEN_VALIDITY_DAYS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(token, expires_at)
    }

    /// The opaque bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Point after which the token must not be presented.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` once `now` has reached the expiry timestamp.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Manual impl so the token never ends up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
