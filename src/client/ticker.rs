// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-interval clock for rendering elapsed time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publish the current time every `period` until all receivers are dropped.
pub fn spawn_ticker(period: Duration) -> (watch::Receiver<DateTime<Utc>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Utc::now());

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(Utc::now()).is_err() {
                break;
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_advances_and_stops() {
        let (mut rx, handle) = spawn_ticker(Duration::from_millis(5));
        let first = *rx.borrow_and_update();

        for _ in 0..3 {
            tokio::time::timeout(Duration::from_secs(1), rx.changed())
                .await
                .expect("tick within a second")
                .unwrap();
        }
        assert!(*rx.borrow() >= first);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker exits once unobserved")
            .unwrap();
    }
}
