// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence collaborator used by the board.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::auth::SessionCookie;
use crate::client::error::ClientError;
use crate::config::DEFAULT_GOAL_DAYS;
use crate::models::{tracker_from_dto, tracker_to_dto, Tracker, TrackerDto};

/// What a load returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBoard {
    pub trackers: Vec<Tracker>,
    pub goal_days: u32,
}

#[async_trait]
pub trait TrackerRepository: Send + Sync {
    async fn load(&self) -> Result<LoadedBoard, ClientError>;

    /// Replace the stored collection with `trackers`.
    async fn save(&self, trackers: Vec<Tracker>) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DaysPayload {
    #[serde(default)]
    trackers: Vec<TrackerDto>,
    #[serde(default = "default_goal_days")]
    goal_days: u32,
}

fn default_goal_days() -> u32 {
    DEFAULT_GOAL_DAYS
}

#[derive(Serialize)]
struct SavePayload {
    trackers: Vec<TrackerDto>,
}

/// [`TrackerRepository`] backed by `/api/days`.
#[derive(Debug, Clone)]
pub struct HttpTrackerRepository {
    http: reqwest::Client,
    base_url: String,
    session: SessionCookie,
}

impl HttpTrackerRepository {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: SessionCookie) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn days_url(&self) -> String {
        format!("{}/api/days", self.base_url)
    }
}

#[async_trait]
impl TrackerRepository for HttpTrackerRepository {
    async fn load(&self) -> Result<LoadedBoard, ClientError> {
        let response = self.session.apply(self.http.get(self.days_url())).send().await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Tracker load rejected");
            return Err(ClientError::Load);
        }

        let payload: DaysPayload = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Tracker load returned an unreadable body");
            ClientError::Load
        })?;

        Ok(LoadedBoard {
            trackers: payload.trackers.into_iter().map(tracker_from_dto).collect(),
            goal_days: payload.goal_days.max(1),
        })
    }

    async fn save(&self, trackers: Vec<Tracker>) -> Result<(), ClientError> {
        let body = SavePayload {
            trackers: trackers.iter().map(tracker_to_dto).collect(),
        };
        let response = self
            .session
            .apply(self.http.post(self.days_url()))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Tracker save rejected");
            return Err(ClientError::Save);
        }
        Ok(())
    }
}
