//! Snapshot capture and reuse.
//!
//! - [`SnapshotProvider`]: captures a [`Snapshot`] on first request and hands
//!   the same `Arc` to every change generated until [`invalidate`] is called
//! - [`MemoryIntrospector`]: in-memory schema for offline planning and tests
//!
//! [`invalidate`]: SnapshotProvider::invalidate

mod memory;

pub use memory::MemoryIntrospector;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cascade::{TriggerConvention, TriggerEngine};
use crate::core::schema::{DeletedObjects, Snapshot};
use crate::core::statement::Statement;
use crate::core::traits::Introspector;
use crate::error::Result;

/// Lazily captured, shareable schema snapshot, together with the connection
/// and trigger convention used for cascade repair.
///
/// Staleness is the caller's contract: once a statement touching a deleted
/// object has executed, call [`invalidate`](Self::invalidate) before the next
/// trigger repair. Nothing here invalidates automatically.
pub struct SnapshotProvider {
    introspector: Arc<dyn Introspector>,
    engine: TriggerEngine,
    schema: Option<String>,
    current: Mutex<Option<Arc<Snapshot>>>,
}

impl SnapshotProvider {
    pub fn new(introspector: Arc<dyn Introspector>, convention: TriggerConvention) -> Self {
        Self {
            introspector,
            engine: TriggerEngine::new(convention),
            schema: None,
            current: Mutex::new(None),
        }
    }

    /// Restrict capture to a schema (builder style).
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Seed the provider with an already captured snapshot.
    pub fn with_snapshot(self, snapshot: Snapshot) -> Self {
        Self {
            current: Mutex::new(Some(Arc::new(snapshot))),
            ..self
        }
    }

    /// Connection used for trigger queries.
    pub fn introspector(&self) -> &dyn Introspector {
        self.introspector.as_ref()
    }

    /// Trigger consistency engine for this connection.
    pub fn trigger_engine(&self) -> &TriggerEngine {
        &self.engine
    }

    /// Current snapshot, capturing it on first use.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let mut current = self.current.lock().await;
        if let Some(snapshot) = current.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(
            self.introspector
                .capture_snapshot(self.schema.as_deref())
                .await?,
        );
        debug!(
            "Captured snapshot: {} tables, {} foreign keys",
            snapshot.tables().len(),
            snapshot.foreign_keys().len()
        );
        *current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Repairs for every managed trigger given the objects about to be deleted.
    pub async fn validate_all_triggers(&self, deleted: &DeletedObjects) -> Result<Vec<Statement>> {
        self.validate_all_triggers_after(&DeletedObjects::new(), deleted)
            .await
    }

    /// Repairs for every managed trigger when earlier changes already delete
    /// `prior`.
    pub async fn validate_all_triggers_after(
        &self,
        prior: &DeletedObjects,
        deleted: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        let snapshot = self.snapshot().await?;
        self.engine
            .validate_all_triggers_after(self.introspector(), &snapshot, prior, deleted)
            .await
    }

    /// Whether a snapshot is currently held.
    pub async fn is_captured(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Drop the held snapshot so the next request recaptures.
    pub async fn invalidate(&self) {
        if self.current.lock().await.take().is_some() {
            debug!("Snapshot invalidated");
        }
    }
}

impl std::fmt::Debug for SnapshotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotProvider")
            .field("schema", &self.schema)
            .field("table_prefix", &self.engine.convention().table_prefix())
            .finish_non_exhaustive()
    }
}
