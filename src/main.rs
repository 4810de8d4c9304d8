// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak-Tracker API Server
//!
//! Serves the password login and the tracker collection, persisted as a
//! single Firestore document.

use streak_tracker::{
    config::{Config, StoreBackend},
    db::TrackerStore,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        session_days = config.session_days,
        goal_days = config.goal_days,
        "Starting Streak-Tracker API"
    );

    if config.session_secret.is_none() {
        tracing::error!("APP_SESSION_SECRET is not set; logins will fail until it is configured");
    }

    let store = match config.store_backend {
        StoreBackend::Firestore => TrackerStore::new(&config.gcp_project_id).await?,
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory tracker store; data is lost on restart");
            TrackerStore::new_in_memory()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store));

    let app = streak_tracker::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("streak_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
