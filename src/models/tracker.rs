// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};

/// One named streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    /// Stable identifier, unique within its collection
    pub key: String,
    /// Display name
    pub label: String,
    /// When the current run started; `None` while idle
    pub start_time: Option<DateTime<Utc>>,
    /// Number of completed relapse events
    pub total_relapses: u64,
    /// Sum of all prior completed run durations (whole seconds)
    pub total_elapsed_seconds: u64,
}

impl Tracker {
    /// A fresh, idle tracker with zeroed counters.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            start_time: None,
            total_relapses: 0,
            total_elapsed_seconds: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Tracker as sent over the wire and stored in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrackerDto {
    pub key: String,
    pub label: String,
    /// ISO 8601 timestamp or null
    pub start_time: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_relapses: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_elapsed_seconds: u64,
}

impl From<&Tracker> for TrackerDto {
    fn from(tracker: &Tracker) -> Self {
        Self {
            key: tracker.key.clone(),
            label: tracker.label.clone(),
            start_time: tracker.start_time.map(format_utc_rfc3339),
            total_relapses: tracker.total_relapses,
            total_elapsed_seconds: tracker.total_elapsed_seconds,
        }
    }
}

impl From<TrackerDto> for Tracker {
    fn from(dto: TrackerDto) -> Self {
        Self {
            key: dto.key,
            label: dto.label,
            start_time: dto.start_time.as_deref().and_then(parse_utc_rfc3339),
            total_relapses: dto.total_relapses,
            total_elapsed_seconds: dto.total_elapsed_seconds,
        }
    }
}

/// Convert a tracker to its wire representation.
pub fn tracker_to_dto(tracker: &Tracker) -> TrackerDto {
    TrackerDto::from(tracker)
}

/// Convert a wire tracker back to the domain type.
///
/// A start time that does not parse as RFC 3339 is treated as idle.
pub fn tracker_from_dto(dto: TrackerDto) -> Tracker {
    Tracker::from(dto)
}

/// Singleton document holding the whole tracker collection.
///
/// Stored at: `days/singleton`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerDocument {
    #[serde(default)]
    pub trackers: Vec<TrackerDto>,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

/// A duration split into display components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct DurationParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationParts {
    const SECONDS_PER_MINUTE: u64 = 60;
    const SECONDS_PER_HOUR: u64 = 60 * Self::SECONDS_PER_MINUTE;
    const SECONDS_PER_DAY: u64 = 24 * Self::SECONDS_PER_HOUR;

    /// Decompose a whole number of seconds into 24h/60m/60s bases.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / Self::SECONDS_PER_DAY,
            hours: (total % Self::SECONDS_PER_DAY) / Self::SECONDS_PER_HOUR,
            minutes: (total % Self::SECONDS_PER_HOUR) / Self::SECONDS_PER_MINUTE,
            seconds: total % Self::SECONDS_PER_MINUTE,
        }
    }
}

/// Derived, render-time metrics for one tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerMetrics {
    pub elapsed: DurationParts,
    pub average_before_relapse: DurationParts,
    /// Percent of the goal reached, in `[0, 100]`
    pub progress: f64,
    pub remaining_percent: f64,
}

/// A tracker paired with its metrics at some instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSummary {
    pub tracker: Tracker,
    pub metrics: TrackerMetrics,
}

/// The headline tracker shown in the page title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSummary {
    pub label: String,
    pub progress: f64,
    pub uses_selected_tracker: bool,
}
