// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password login and session routes.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::has_valid_session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/auth-check", get(auth_check))
        .route("/api/logout", post(logout))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OkResponse {
    pub ok: bool,
}

/// Pull the password out of a login body; anything but a string is empty.
fn parse_password(body: &[u8]) -> Result<String> {
    if body.is_empty() {
        return Ok(String::new());
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))?;
    Ok(value
        .get("password")
        .and_then(|p| p.as_str())
        .unwrap_or_default()
        .to_string())
}

/// Exchange the app password for a session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<OkResponse>)> {
    let password = parse_password(&body)?;

    let matches: bool = password
        .as_bytes()
        .ct_eq(state.config.app_password.as_bytes())
        .into();
    if !matches {
        tracing::warn!("Login rejected: invalid password");
        return Err(AppError::InvalidPassword);
    }

    let token = state
        .session
        .create_token()
        .map_err(|_| AppError::Configuration("APP_SESSION_SECRET"))?;

    tracing::info!(
        duration_days = state.session.duration_days(),
        "Login successful, session issued"
    );

    Ok((
        jar.add(state.session.session_cookie(token)),
        Json(OkResponse { ok: true }),
    ))
}

/// Report whether the caller holds a live session.
async fn auth_check(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let ok = has_valid_session(&state, &jar);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(OkResponse { ok }))
}

/// Clear the session cookie. The token itself stays valid until expiry.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        jar.add(state.session.removal_cookie()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_password() {
        assert_eq!(parse_password(b"").unwrap(), "");
        assert_eq!(parse_password(br#"{"password":"pw"}"#).unwrap(), "pw");
        assert_eq!(parse_password(br#"{"password":42}"#).unwrap(), "");
        assert_eq!(parse_password(b"{}").unwrap(), "");
        assert!(matches!(
            parse_password(b"{not json"),
            Err(AppError::BadRequest(_))
        ));
    }
}
