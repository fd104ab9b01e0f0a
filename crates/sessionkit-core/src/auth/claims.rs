//! Credential decoding and session validity.
//!
//! Claims are read from the token payload without checking the signature.
//! The server is the only party that can establish trust in a credential;
//! everything here is advisory and only drives local UI state.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::store::TokenStore;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),

    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded token payload: expiry plus whatever profile fields the issuer added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry in seconds since the epoch. May carry a fractional part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,

    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .filter(|exp| exp.is_finite())
            .and_then(|exp| Utc.timestamp_millis_opt((exp * 1000.0) as i64).single())
    }

    /// Convenience accessor for a string profile field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at().map(|expiry| expiry - now)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.time_until_expiry(now).map(|d| d.num_minutes().max(0))
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Segments(segments.len()));
    }

    let payload = segments[1];
    // Some issuers pad their segments
    let bytes = if payload.ends_with('=') {
        URL_SAFE.decode(payload)?
    } else {
        URL_SAFE_NO_PAD.decode(payload)?
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// True iff the expiry is not after `now`. Tokens without `exp` never expire.
pub fn is_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    match claims.exp {
        Some(exp) => exp * 1000.0 <= now.timestamp_millis() as f64,
        None => false,
    }
}

/// Expiry check on a raw token.
///
/// Fail-open: a token that cannot be decoded reports as NOT expired. Callers
/// that need a real validity answer should use [`logged_in`], which also
/// requires a successful decode.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Ok(claims) => is_expired(&claims, now),
        Err(e) => {
            debug!(error = %e, "Undecodable token treated as unexpired");
            false
        }
    }
}

/// A credential is present, decodes, and has not expired.
pub fn logged_in(store: &dyn TokenStore, now: DateTime<Utc>) -> bool {
    valid_token(store, now).is_some()
}

/// The stored credential, only when [`logged_in`] would be true.
pub fn valid_token(store: &dyn TokenStore, now: DateTime<Utc>) -> Option<String> {
    let token = read_token(store)?;
    match decode(&token) {
        Ok(claims) if !is_expired(&claims, now) => Some(token),
        _ => None,
    }
}

/// Claims of the stored credential, if any and well-formed.
pub fn profile(store: &dyn TokenStore) -> Option<Claims> {
    read_token(store).and_then(|token| decode(&token).ok())
}

/// Store read where a backend failure counts as "no credential".
pub(crate) fn read_token(store: &dyn TokenStore) -> Option<String> {
    match store.get() {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Failed to read token store, treating as signed out");
            None
        }
    }
}
