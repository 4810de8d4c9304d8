// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client side of the tracker API.
//!
//! The [`TrackerBoard`] keeps the authoritative in-memory tracker list for a
//! session and pushes full-collection saves through a [`TrackerRepository`].

pub mod auth;
pub mod board;
pub mod error;
pub mod repository;
pub mod selection;
pub mod ticker;

pub use auth::{AuthClient, HttpAuthClient, LoginOutcome, SessionCookie};
pub use board::{BoardState, PendingSave, SyncStatus, TrackerBoard};
pub use error::ClientError;
pub use repository::{HttpTrackerRepository, LoadedBoard, TrackerRepository};
pub use selection::{FileSelectionStore, MemorySelectionStore, SelectionStore};
pub use ticker::spawn_ticker;
