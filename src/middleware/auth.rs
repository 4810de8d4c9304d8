// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie authentication middleware.

use crate::error::AppError;
use crate::services::session::SESSION_COOKIE_NAME;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Whether the request carries a live session cookie.
pub fn has_valid_session(state: &AppState, jar: &CookieJar) -> bool {
    let token = jar.get(SESSION_COOKIE_NAME).map(|c| c.value());
    state.session.verify_token(token)
}

/// Middleware that requires a valid session cookie.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !has_valid_session(&state, &jar) {
        tracing::debug!(path = %request.uri().path(), "Rejected request without valid session");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
