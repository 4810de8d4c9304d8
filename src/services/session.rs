// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless session tokens.
//!
//! A token is `"{expires_at_ms}.{hex_hmac}"` where the HMAC-SHA256 covers
//! the decimal expiry. Verification needs only the secret, so there is no
//! session store and no revocation before expiry.

use axum_extra::extract::cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::time_utils::now_millis;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the session token, shared by server and client.
pub const SESSION_COOKIE_NAME: &str = "activity_session";

const TOKEN_SEPARATOR: char = '.';
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session secret is not configured")]
    MissingSecret,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    secret: Option<Vec<u8>>,
    duration_days: u32,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("duration_days", &self.duration_days)
            .finish()
    }
}

impl SessionCodec {
    pub fn new(secret: Option<Vec<u8>>, duration_days: u32) -> Self {
        Self {
            secret,
            duration_days: duration_days.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_secret.clone(), config.session_days)
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    fn sign(&self, expires_at: i64) -> Result<Vec<u8>, SessionError> {
        let secret = self.secret.as_deref().ok_or(SessionError::MissingSecret)?;
        // HMAC accepts keys of any length.
        let mut mac =
            HmacSha256::new_from_slice(secret).map_err(|_| SessionError::MissingSecret)?;
        mac.update(expires_at.to_string().as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Create a token expiring `duration_days` from now.
    pub fn create_token(&self) -> Result<String, SessionError> {
        self.create_token_at(now_millis())
    }

    /// Create a token as if the current time were `now_ms`.
    pub fn create_token_at(&self, now_ms: i64) -> Result<String, SessionError> {
        let expires_at = now_ms + i64::from(self.duration_days) * MILLIS_PER_DAY;
        let signature = self.sign(expires_at)?;
        Ok(format!(
            "{expires_at}{TOKEN_SEPARATOR}{}",
            hex::encode(signature)
        ))
    }

    /// Check a token against the current time.
    pub fn verify_token(&self, token: Option<&str>) -> bool {
        self.verify_token_at(token, now_millis())
    }

    /// Check a token as if the current time were `now_ms`.
    ///
    /// Every failure mode returns `false`; callers cannot distinguish an
    /// expired token from a forged one.
    pub fn verify_token_at(&self, token: Option<&str>, now_ms: i64) -> bool {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return false;
        };

        let mut parts = token.split(TOKEN_SEPARATOR);
        let (Some(expires_raw), Some(signature_hex), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if expires_raw.is_empty() || signature_hex.is_empty() {
            return false;
        }

        let Ok(expires_at) = expires_raw.parse::<i64>() else {
            return false;
        };
        // A token is live strictly before its expiry instant.
        if expires_at <= now_ms {
            return false;
        }

        let Ok(provided) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(expected) = self.sign(expires_at) else {
            tracing::warn!("Session secret missing, rejecting token");
            return false;
        };

        // Slices of different lengths compare unequal.
        provided.as_slice().ct_eq(expected.as_slice()).into()
    }

    /// Cookie that carries a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::seconds(
                i64::from(self.duration_days) * SECONDS_PER_DAY,
            ))
            .build()
    }

    /// Cookie that clears the session; attributes match [`Self::session_cookie`].
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }
}
