// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Numeric settings fall back to defaults when absent or unparsable. The
//! session signing secret is never defaulted: without it the server still
//! starts, but login answers with a configuration error.

use std::env;

/// Default lifetime of a session token, in days.
pub const DEFAULT_SESSION_DAYS: u32 = 30;
/// Default goal against which tracker progress is computed, in days.
pub const DEFAULT_GOAL_DAYS: u32 = 60;

/// Which storage backend holds the tracker document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage backend for the tracker document
    pub store_backend: StoreBackend,
    /// Session lifetime in days (at least 1)
    pub session_days: u32,
    /// Tracker goal in days (at least 1)
    pub goal_days: u32,

    // --- Secrets ---
    /// Password that unlocks the app
    pub app_password: String,
    /// HMAC key for session tokens (raw bytes)
    pub session_secret: Option<Vec<u8>>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            session_days: DEFAULT_SESSION_DAYS,
            goal_days: DEFAULT_GOAL_DAYS,
            app_password: "test_password".to_string(),
            session_secret: Some(b"test_session_secret_32_bytes!!!!".to_vec()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            session_days: read_days("APP_SESSION_DAYS", DEFAULT_SESSION_DAYS),
            goal_days: read_days("GOAL_DAYS", DEFAULT_GOAL_DAYS),

            app_password: env::var("APP_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("APP_PASSWORD"))?,
            session_secret: env::var("APP_SESSION_SECRET")
                .ok()
                .filter(|v| !v.is_empty())
                .map(String::into_bytes),
        })
    }
}

/// Read a day count, defaulting when unset or unparsable and never below 1.
fn read_days(key: &str, fallback: u32) -> u32 {
    parse_days(env::var(key).ok().as_deref(), fallback)
}

fn parse_days(raw: Option<&str>, fallback: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.floor().clamp(1.0, u32::MAX as f64) as u32)
        .unwrap_or(fallback)
        .max(1)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
