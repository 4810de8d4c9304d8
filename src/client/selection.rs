// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-local storage for the pinned title tracker.
//!
//! Like browser local storage, reads and writes never fail: an unreadable
//! store behaves as empty and a failed write is dropped.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage key for the selected tracker.
pub const SELECTED_TRACKER_KEY: &str = "days_selected_key";

pub trait SelectionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, key: &str);
}

/// Selection kept only for the life of the process.
#[derive(Debug, Default)]
pub struct MemorySelectionStore(Mutex<Option<String>>);

impl MemorySelectionStore {
    pub fn with_selection(key: impl Into<String>) -> Self {
        Self(Mutex::new(Some(key.into())))
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, key: &str) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = Some(key.to_string());
    }
}

/// Selection persisted as a small JSON map on disk.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        std::fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self) -> Option<String> {
        self.read_map().remove(SELECTED_TRACKER_KEY)
    }

    fn set(&self, key: &str) {
        let mut map = self.read_map();
        map.insert(SELECTED_TRACKER_KEY.to_string(), key.to_string());

        let result = serde_json::to_vec_pretty(&map)
            .map_err(std::io::Error::from)
            .and_then(|bytes| std::fs::write(&self.path, bytes));
        if let Err(e) = result {
            tracing::debug!(path = %self.path.display(), error = %e, "Dropped selection write");
        }
    }
}
