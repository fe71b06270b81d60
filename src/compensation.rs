//! Append-style log of missed/failed trigger events.
//!
//! Kept separate from the registry's job-definition paths so the different
//! semantics stay explicit: compensation records are insert-only, have no
//! update path, and are never mirrored into the cache.

use std::sync::Arc;

use tracing::debug;

use crate::model::CompensationRecord;
use crate::store::{JobStore, Result};

pub struct CompensationLog {
    store: Arc<dyn JobStore>,
}

impl CompensationLog {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Append one compensation record, stamped with `actor`.
    pub async fn record(
        &self,
        record: CompensationRecord,
        actor: &str,
    ) -> Result<CompensationRecord> {
        debug!(job_name = %record.job_name, actor, "Logging compensation event");
        self.store.save_compensation(record, actor).await
    }
}
