// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session client: password login and session checks.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;

use crate::services::session::SESSION_COOKIE_NAME;

/// Session token captured from the login response, shared between clients.
#[derive(Clone, Default)]
pub struct SessionCookie(Arc<RwLock<Option<String>>>);

impl SessionCookie {
    pub fn set(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Add the `Cookie` header when a token is held.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}")),
            None => request,
        }
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let held = self.token().is_some();
        f.debug_tuple("SessionCookie").field(&held).finish()
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub ok: bool,
    pub error: Option<String>,
}

impl LoginOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Whether the current session is still accepted. Never errors.
    async fn check_session(&self) -> bool;

    async fn login(&self, password: &str) -> LoginOutcome;
}

#[derive(Deserialize, Default)]
struct AuthPayload {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// [`AuthClient`] backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionCookie,
}

impl HttpAuthClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: SessionCookie) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionCookie {
        &self.session
    }

    fn capture_session(&self, response: &reqwest::Response) {
        let token = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| Cookie::parse(raw.to_string()).ok())
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string());

        if let Some(token) = token {
            self.session.set(token);
        }
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn check_session(&self) -> bool {
        let url = format!("{}/api/auth-check", self.base_url);
        let response = match self.session.apply(self.http.get(&url)).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Session check failed");
                return false;
            }
        };
        if !response.status().is_success() {
            return false;
        }
        response
            .json::<AuthPayload>()
            .await
            .map(|p| p.ok)
            .unwrap_or(false)
    }

    async fn login(&self, password: &str) -> LoginOutcome {
        let url = format!("{}/api/login", self.base_url);
        let response = match self
            .http
            .post(&url)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Login request failed");
                return LoginOutcome::failed("Network error");
            }
        };

        let status = response.status();
        if status.is_success() {
            self.capture_session(&response);
        }
        let payload = response.json::<AuthPayload>().await.unwrap_or_default();

        if !status.is_success() || !payload.ok {
            return LoginOutcome::failed(
                payload
                    .error
                    .unwrap_or_else(|| "Invalid password".to_string()),
            );
        }

        LoginOutcome {
            ok: true,
            error: None,
        }
    }
}
