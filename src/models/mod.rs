// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod tracker;

pub use tracker::{
    tracker_from_dto, tracker_to_dto, DurationParts, HeaderSummary, Tracker, TrackerDocument,
    TrackerDto, TrackerMetrics, TrackerSummary,
};
