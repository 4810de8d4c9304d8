// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod session;
pub mod trackers;

pub use session::{SessionCodec, SessionError, SESSION_COOKIE_NAME};
