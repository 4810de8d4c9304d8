// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker board: the client's in-memory tracker list and its sync status.
//!
//! Every mutation is applied to local state immediately, then the whole
//! collection is saved in the background. A failed save leaves local state
//! alone and surfaces the error through [`BoardState::sync_error`]. Saves are
//! not queued; the last snapshot to reach the server wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::repository::TrackerRepository;
use crate::client::selection::SelectionStore;
use crate::config::DEFAULT_GOAL_DAYS;
use crate::models::{HeaderSummary, Tracker, TrackerSummary};
use crate::services::trackers;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Saving,
    Error,
}

/// Observable board state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub trackers: Vec<Tracker>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub sync_error: Option<String>,
    pub sync_status: SyncStatus,
    /// Pinned title tracker, empty when none
    pub selected_key: String,
    pub goal_days: u32,
}

impl BoardState {
    fn initial(selected_key: String) -> Self {
        Self {
            trackers: Vec::new(),
            loading: true,
            load_error: None,
            sync_error: None,
            sync_status: SyncStatus::Idle,
            selected_key,
            goal_days: DEFAULT_GOAL_DAYS,
        }
    }
}

/// Handle to the background save started by a mutation.
///
/// Dropping it does not cancel the save.
#[derive(Debug)]
pub struct PendingSave(Option<JoinHandle<()>>);

impl PendingSave {
    fn none() -> Self {
        Self(None)
    }

    /// Whether the mutation changed anything worth saving.
    pub fn is_scheduled(&self) -> bool {
        self.0.is_some()
    }

    /// Wait until the save has completed and its outcome is in the board state.
    pub async fn finished(self) {
        if let Some(handle) = self.0 {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Tracker save task failed");
            }
        }
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct TrackerBoard {
    repo: Arc<dyn TrackerRepository>,
    selection: Arc<dyn SelectionStore>,
    state: Arc<watch::Sender<BoardState>>,
    saves_in_flight: Arc<AtomicUsize>,
    clock: Clock,
    load_task: Mutex<Option<JoinHandle<()>>>,
}

impl TrackerBoard {
    /// Create the board and start its one and only load.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(repo: Arc<dyn TrackerRepository>, selection: Arc<dyn SelectionStore>) -> Self {
        Self::with_clock(repo, selection, Arc::new(Utc::now))
    }

    pub fn with_clock(
        repo: Arc<dyn TrackerRepository>,
        selection: Arc<dyn SelectionStore>,
        clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        let selected = selection.get().unwrap_or_default();
        let (tx, _rx) = watch::channel(BoardState::initial(selected));
        let state = Arc::new(tx);

        let load_task = tokio::spawn({
            let repo = repo.clone();
            let state = state.clone();
            async move {
                let result = repo.load().await;
                state.send_modify(|s| {
                    s.loading = false;
                    match result {
                        Ok(loaded) => {
                            tracing::debug!(count = loaded.trackers.len(), "Trackers loaded");
                            s.trackers = loaded.trackers;
                            s.goal_days = loaded.goal_days;
                            s.load_error = None;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Tracker load failed");
                            s.load_error = Some(e.to_string());
                        }
                    }
                });
            }
        });

        Self {
            repo,
            selection,
            state,
            saves_in_flight: Arc::new(AtomicUsize::new(0)),
            clock,
            load_task: Mutex::new(Some(load_task)),
        }
    }

    /// Wait for the initial load to settle.
    pub async fn loaded(&self) {
        let task = self
            .load_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Tracker load task failed");
            }
        }
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.state.subscribe()
    }

    /// Add a tracker. Blank labels are ignored.
    pub fn add(&self, label: &str) -> PendingSave {
        let label = label.trim();
        if label.is_empty() {
            return PendingSave::none();
        }
        self.mutate(|current| trackers::add_tracker(current, label))
    }

    pub fn start(&self, key: &str) -> PendingSave {
        let now = (self.clock)();
        self.mutate(|current| trackers::start_tracker(current, key, now))
    }

    pub fn relapse(&self, key: &str) -> PendingSave {
        let now = (self.clock)();
        self.mutate(|current| trackers::relapse_tracker(current, key, now))
    }

    pub fn reset(&self, key: &str) -> PendingSave {
        self.mutate(|current| trackers::reset_tracker(current, key))
    }

    pub fn delete(&self, key: &str) -> PendingSave {
        let pending = self.mutate(|current| trackers::delete_tracker(current, key));

        let cleared = self.state.send_if_modified(|s| {
            if s.selected_key != key {
                return false;
            }
            s.selected_key.clear();
            true
        });
        if cleared {
            self.selection.set("");
        }
        pending
    }

    /// Pin the title tracker. Local only.
    pub fn select_title(&self, key: &str) {
        self.state.send_modify(|s| s.selected_key = key.to_string());
        self.selection.set(key);
    }

    pub fn summaries(&self, now: DateTime<Utc>) -> Vec<TrackerSummary> {
        let state = self.state.borrow();
        state
            .trackers
            .iter()
            .map(|t| trackers::build_tracker_summary(t, now, state.goal_days))
            .collect()
    }

    pub fn header(&self, now: DateTime<Utc>) -> Option<HeaderSummary> {
        let summaries = self.summaries(now);
        let selected = self.state.borrow().selected_key.clone();
        trackers::derive_header_summary(&summaries, &selected)
    }

    pub fn title(&self, now: DateTime<Utc>) -> String {
        trackers::document_title(self.header(now).as_ref())
    }

    fn mutate(&self, transition: impl FnOnce(&[Tracker]) -> Vec<Tracker>) -> PendingSave {
        let mut snapshot = Vec::new();
        self.state.send_modify(|s| {
            s.trackers = transition(&s.trackers);
            s.sync_status = SyncStatus::Saving;
            snapshot = s.trackers.clone();
        });
        self.saves_in_flight.fetch_add(1, Ordering::SeqCst);

        let repo = self.repo.clone();
        let state = self.state.clone();
        let in_flight = self.saves_in_flight.clone();
        PendingSave(Some(tokio::spawn(async move {
            let result = repo.save(snapshot).await;
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            state.send_modify(|s| match result {
                Ok(()) => {
                    s.sync_error = None;
                    if remaining == 0 {
                        s.sync_status = SyncStatus::Idle;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Tracker save failed");
                    s.sync_error = Some(e.to_string());
                    s.sync_status = SyncStatus::Error;
                }
            });
        })))
    }
}
