// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker collection routes (require a session).

use crate::error::{AppError, Result};
use crate::models::TrackerDto;
use crate::services::trackers::{unique_key, TRACKER_KEY_PREFIX};
use crate::time_utils::{format_utc_rfc3339, now_millis, parse_utc_rfc3339};
use crate::AppState;
use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Label stored when a saved tracker has none.
pub const TRACKER_LABEL_FALLBACK: &str = "Untitled Tracker";

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/days", get(get_days).post(save_days))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DaysResponse {
    pub trackers: Vec<TrackerDto>,
    pub goal_days: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveDaysResponse {
    pub ok: bool,
    pub trackers: Vec<TrackerDto>,
}

/// Get the whole tracker collection.
async fn get_days(State(state): State<Arc<AppState>>) -> Result<Json<DaysResponse>> {
    let trackers = state.store.get_trackers().await?;
    tracing::debug!(count = trackers.len(), "Loaded trackers");

    Ok(Json(DaysResponse {
        trackers,
        goal_days: state.config.goal_days,
    }))
}

/// Replace the whole tracker collection.
async fn save_days(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveDaysResponse>> {
    let trackers = parse_save_payload(&body)?;
    let count = trackers.len();

    let saved = state.store.set_trackers(trackers).await?;
    tracing::info!(count, "Saved trackers");

    Ok(Json(SaveDaysResponse {
        ok: true,
        trackers: saved,
    }))
}

/// Parse and sanitize a `{trackers: [...]}` body.
///
/// An absent body or absent `trackers` field yields an empty collection.
fn parse_save_payload(body: &[u8]) -> Result<Vec<TrackerDto>> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Invalid JSON payload".to_string()))?;
    let invalid = || AppError::BadRequest("Invalid payload".to_string());

    let object = payload.as_object().ok_or_else(invalid)?;
    match object.get("trackers") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(sanitize_trackers(items)),
        Some(_) => Err(invalid()),
    }
}

fn sanitize_trackers(items: &[Value]) -> Vec<TrackerDto> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|raw| {
            let mut tracker = sanitize_tracker(raw);
            tracker.key = unique_key(tracker.key, |candidate| seen.contains(candidate));
            seen.insert(tracker.key.clone());
            tracker
        })
        .collect()
}

fn sanitize_tracker(raw: &Value) -> TrackerDto {
    TrackerDto {
        key: non_blank_string(raw.get("key"))
            .unwrap_or_else(|| format!("{TRACKER_KEY_PREFIX}-{}", now_millis())),
        label: non_blank_string(raw.get("label"))
            .unwrap_or_else(|| TRACKER_LABEL_FALLBACK.to_string()),
        start_time: raw
            .get("startTime")
            .and_then(Value::as_str)
            .and_then(parse_utc_rfc3339)
            .map(format_utc_rfc3339),
        total_relapses: non_negative_count(raw.get("totalRelapses")),
        total_elapsed_seconds: non_negative_count(raw.get("totalElapsedSeconds")),
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Largest counter value; Firestore integers are signed 64-bit.
const MAX_COUNT: u64 = i64::MAX as u64;

/// Finite, non-negative numbers truncated to an integer and capped at
/// [`MAX_COUNT`]; anything else is 0.
fn non_negative_count(value: Option<&Value>) -> u64 {
    let count = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    };
    count.min(MAX_COUNT)
}
