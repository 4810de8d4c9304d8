// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak-Tracker: password-gated personal habit/streak tracking
//!
//! This crate provides the backend API that stores the tracker collection
//! behind a signed session cookie, plus the client-side board that drives
//! tracker state transitions against that API.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::TrackerStore;
use services::SessionCodec;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: TrackerStore,
    pub session: SessionCodec,
}

impl AppState {
    pub fn new(config: Config, store: TrackerStore) -> Self {
        let session = SessionCodec::from_config(&config);
        Self {
            config,
            store,
            session,
        }
    }
}
