//! Durable storage of job definitions and compensation records.
//!
//! [`JobStore`] is the narrow contract the registry composes over; the
//! production implementation is [`FjallJobStore`], backed by a fjall embedded
//! keyspace. The store performs no retries: any backend failure surfaces as
//! a [`StoreError`] and recovery is the caller's concern.

pub mod error;
pub mod fjall;
pub mod keys;

pub use error::{Result, StoreError};
pub use self::fjall::{FjallJobStore, StoreStats};

use std::collections::HashSet;

use async_trait::async_trait;

use crate::model::{CompensationRecord, JobDefinition};

/// Storage contract for job definitions and compensation records.
///
/// All writes are upserts keyed by `job_name`; duplicate names are never
/// rejected, the last write wins. Audit stamping is the store's job on the
/// single-save and compensation paths; batch elements arrive pre-stamped by
/// the registry (see [`save_batch`](JobStore::save_batch)).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Return every persisted job definition.
    async fn list_all(&self) -> Result<Vec<JobDefinition>>;

    /// Look up one definition by name; a miss is `None`, not an error.
    async fn find_by_name(&self, job_name: &str) -> Result<Option<JobDefinition>>;

    /// Look up a set of names; names not found are omitted from the result.
    async fn find_by_names(&self, job_names: &HashSet<String>) -> Result<Vec<JobDefinition>>;

    /// Upsert one definition.
    ///
    /// On insert both created and updated audit fields are stamped with
    /// `actor` and the current time; on update the created fields of the
    /// existing row are preserved and only the updated fields are restamped.
    async fn save(&self, def: JobDefinition, actor: &str) -> Result<JobDefinition>;

    /// Upsert a batch with the same per-element semantics as [`save`](JobStore::save).
    ///
    /// Elements arrive with `updated_by`/`updated_date` already stamped by
    /// the registry (one actor/time for the whole batch). The batch commits
    /// atomically: either every element is persisted or none is.
    async fn save_batch(&self, defs: Vec<JobDefinition>) -> Result<Vec<JobDefinition>>;

    /// Delete one definition by name; deleting an absent name is a no-op.
    async fn delete_by_name(&self, job_name: &str) -> Result<()>;

    /// Delete every job definition. Compensation records are untouched.
    async fn delete_all(&self) -> Result<()>;

    /// Append a compensation record; always an insert, never an update.
    ///
    /// Created and updated audit fields are stamped identically.
    async fn save_compensation(
        &self,
        record: CompensationRecord,
        actor: &str,
    ) -> Result<CompensationRecord>;
}
