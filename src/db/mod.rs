// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod store;

pub use store::TrackerStore;

/// Collection names as constants.
pub mod collections {
    /// Holds the single tracker document
    pub const DAYS: &str = "days";
}

/// Document ID of the tracker collection document.
pub const SINGLETON_ID: &str = "singleton";
