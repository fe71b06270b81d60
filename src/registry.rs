//! The job registry façade.
//!
//! [`JobRegistry`] is the only component callers interact with directly. It
//! composes the durable [`JobStore`], the in-process [`JobCache`] read by
//! the scheduler runtime, and the [`CompensationLog`].
//!
//! # Store/cache consistency
//!
//! Store writes and cache mutations are deliberately separate calls: after
//! `register` or `remove_job` the cache is stale until the caller either
//! performs the matching [`toggle_cache`](JobRegistry::toggle_cache) or a
//! full [`list_all`](JobRegistry::list_all) refresh. `list_cached` may
//! therefore return a job already deleted from the store, or miss one just
//! added. The paired variants [`register_cached`](JobRegistry::register_cached)
//! and [`remove_job_cached`](JobRegistry::remove_job_cached) perform the
//! matching cache mutation immediately after a successful store write for
//! callers that want the two kept together; the two-call pattern remains
//! the default.
//!
//! Every mutating operation takes the acting user explicitly; the registry
//! never falls back to a built-in system actor.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::JobCache;
use crate::compensation::CompensationLog;
use crate::keygen;
use crate::model::{CompensationRecord, JobDefinition, JobSubmission, JobView};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::store::{JobStore, Result};

/// Cache membership operation for [`JobRegistry::toggle_cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Add,
    Remove,
}

pub struct JobRegistry {
    store: Arc<dyn JobStore>,
    cache: JobCache,
    compensation: CompensationLog,
    metrics: Metrics,
}

impl JobRegistry {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            compensation: CompensationLog::new(Arc::clone(&store)),
            store,
            cache: JobCache::new(),
            metrics: Metrics::new(),
        }
    }

    /// Read every job definition from the store and refresh the cache with
    /// the result.
    ///
    /// This is the only operation that reconciles cache and store.
    pub async fn list_all(&self, actor: &str) -> Result<Vec<JobDefinition>> {
        let definitions = self.store.list_all().await?;
        self.cache.replace_all(definitions.clone());
        self.metrics.cache_refreshed();
        info!(actor, count = definitions.len(), "Refreshed job cache from store");
        Ok(definitions)
    }

    /// Current cache contents; never touches the store and may be stale.
    pub fn list_cached(&self) -> Arc<Vec<JobDefinition>> {
        self.cache.snapshot()
    }

    /// Look up one definition; a miss is `None`, not an error.
    pub async fn get_job(&self, job_name: &str) -> Result<Option<JobDefinition>> {
        self.store.find_by_name(job_name).await
    }

    /// Look up a set of definitions; unmatched names are omitted.
    pub async fn get_jobs(&self, job_names: &HashSet<String>) -> Result<Vec<JobDefinition>> {
        self.store.find_by_names(job_names).await
    }

    /// Register (upsert) one job.
    ///
    /// A blank submission name gets a derived key; the trigger name always
    /// mirrors the resolved job name. The cache is untouched: follow up with
    /// [`toggle_cache`](JobRegistry::toggle_cache) or a full refresh.
    pub async fn register(&self, submission: JobSubmission, actor: &str) -> Result<JobDefinition> {
        let job_name = keygen::derive_job_key(&submission.job_name, &submission.cron_expression);
        let def = JobDefinition::new(
            job_name.clone(),
            job_name,
            submission.class_url,
            submission.class_name,
            submission.cron_expression,
            submission.job_param,
            submission.shard_tag,
        );

        let saved = self.store.save(def, actor).await?;
        self.metrics.job_saved();
        debug!(job_name = %saved.job_name, actor, "Registered job");
        Ok(saved)
    }

    /// Bulk upsert.
    ///
    /// Every element gets its updated audit stamp set to the same
    /// actor/time before the batch hits the store; created stamps of
    /// existing rows are preserved by the store. The batch is
    /// all-or-nothing.
    pub async fn register_batch(
        &self,
        defs: Vec<JobDefinition>,
        actor: &str,
    ) -> Result<Vec<JobDefinition>> {
        let now = Utc::now();
        let stamped: Vec<JobDefinition> = defs
            .into_iter()
            .map(|mut def| {
                def.updated_by = actor.to_string();
                def.updated_date = now;
                def
            })
            .collect();

        let saved = self.store.save_batch(stamped).await?;
        self.metrics.jobs_saved(saved.len() as u64);
        debug!(count = saved.len(), actor, "Registered job batch");
        Ok(saved)
    }

    /// Delete one job from the store; absent names are a no-op. The cache is
    /// untouched.
    pub async fn remove_job(&self, job_name: &str) -> Result<()> {
        self.store.delete_by_name(job_name).await?;
        self.metrics.job_deleted();
        Ok(())
    }

    /// Add or remove one definition in the cache. No store effect.
    ///
    /// An `Add` for a name already cached is skipped so the cache never
    /// holds two entries with the same job name; the membership check and
    /// the insert happen under the cache writer lock, so concurrent adds
    /// of the same name cannot race past each other.
    pub fn toggle_cache(&self, def: &JobDefinition, op: CacheOp) {
        match op {
            CacheOp::Add => {
                if !self.cache.add_if_absent(def.clone()) {
                    warn!(job_name = %def.job_name, "Job already cached, skipping add");
                }
            }
            CacheOp::Remove => self.cache.remove_by_name(&def.job_name),
        }
    }

    /// Register and immediately cache the job.
    ///
    /// The cache add happens only after the store write succeeds; on store
    /// failure the cache is untouched.
    pub async fn register_cached(
        &self,
        submission: JobSubmission,
        actor: &str,
    ) -> Result<JobDefinition> {
        let saved = self.register(submission, actor).await?;
        self.toggle_cache(&saved, CacheOp::Add);
        Ok(saved)
    }

    /// Delete a job and immediately drop it from the cache.
    pub async fn remove_job_cached(&self, job_name: &str) -> Result<()> {
        self.remove_job(job_name).await?;
        self.cache.remove_by_name(job_name);
        Ok(())
    }

    /// Delete every job definition from the store. The cache is untouched.
    pub async fn purge_all_jobs(&self) -> Result<()> {
        self.store.delete_all().await
    }

    /// Clear the cache. The store is untouched.
    pub fn purge_cache(&self) {
        self.cache.clear();
    }

    /// Append a missed/failed execution event.
    pub async fn record_compensation(
        &self,
        record: CompensationRecord,
        actor: &str,
    ) -> Result<CompensationRecord> {
        let saved = self.compensation.record(record, actor).await?;
        self.metrics.compensation_recorded();
        Ok(saved)
    }

    /// Project a definition for the scheduler runtime or API clients.
    pub fn to_view(def: &JobDefinition) -> JobView {
        JobView::from(def)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
