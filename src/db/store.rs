// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage for the tracker collection.
//!
//! The whole collection lives in one document (`days/singleton`) and every
//! save overwrites it. There is no version field, so two writers racing a
//! read-modify-write will silently lose one of the updates.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::{collections, SINGLETON_ID};
use crate::error::AppError;
use crate::models::{TrackerDocument, TrackerDto};
use crate::time_utils::format_utc_rfc3339;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<RwLock<TrackerDocument>>),
    Offline,
}

/// Tracker document store.
#[derive(Clone)]
pub struct TrackerStore {
    backend: Backend,
}

impl TrackerStore {
    /// Create a new Firestore-backed store.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Process-local store, for tests and `STORE_BACKEND=memory`.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(TrackerDocument::default()))),
        }
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All operations return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// Read the stored collection; an absent document is an empty list.
    pub async fn get_trackers(&self) -> Result<Vec<TrackerDto>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let doc: Option<TrackerDocument> = client
                    .fluent()
                    .select()
                    .by_id_in(collections::DAYS)
                    .obj()
                    .one(SINGLETON_ID)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(doc.map(|d| d.trackers).unwrap_or_default())
            }
            Backend::Memory(doc) => Ok(doc.read().await.trackers.clone()),
            Backend::Offline => Err(offline()),
        }
    }

    /// Replace the stored collection and return what was written.
    pub async fn set_trackers(&self, trackers: Vec<TrackerDto>) -> Result<Vec<TrackerDto>, AppError> {
        let doc = TrackerDocument {
            trackers,
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        match &self.backend {
            Backend::Firestore(client) => {
                let saved: TrackerDocument = client
                    .fluent()
                    .update()
                    .in_col(collections::DAYS)
                    .document_id(SINGLETON_ID)
                    .object(&doc)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                tracing::debug!(count = saved.trackers.len(), "Tracker document written");
                Ok(saved.trackers)
            }
            Backend::Memory(slot) => {
                let trackers = doc.trackers.clone();
                *slot.write().await = doc;
                Ok(trackers)
            }
            Backend::Offline => Err(offline()),
        }
    }
}

fn offline() -> AppError {
    AppError::Database("Database not connected (offline mode)".to_string())
}
