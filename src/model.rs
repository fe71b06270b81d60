//! Core data model for the job registry.
//!
//! A [`JobDefinition`] is the persisted description of one schedulable task:
//! where the executable unit lives (`class_url`/`class_name`), when it fires
//! (`cron_expression`, opaque to this crate), and an opaque parameter payload
//! forwarded to the execution unit. `job_name` is the unique key across both
//! the store and the in-memory cache.
//!
//! Audit fields (`created_by`/`created_date`/`updated_by`/`updated_date`) are
//! stamped by the store on write, never by callers. [`JobView`] is the
//! projection handed to the scheduler runtime and API clients; it carries no
//! audit fields by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A schedulable task description, as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Unique key across store and cache.
    pub job_name: String,
    /// Named firing mechanism; mirrors `job_name` in practice.
    pub trigger_name: String,
    pub class_url: String,
    pub class_name: String,
    /// Schedule spec, interpreted only by the external scheduler runtime.
    pub cron_expression: String,
    /// Opaque payload forwarded to the execution unit.
    pub job_param: String,
    /// Optional sharding hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_tag: Option<String>,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub updated_by: String,
    pub updated_date: DateTime<Utc>,
}

impl JobDefinition {
    /// Build a definition with placeholder audit fields.
    ///
    /// The store overwrites the audit stamps on save, so callers constructing
    /// a definition for registration never fill them in themselves.
    pub fn new(
        job_name: impl Into<String>,
        trigger_name: impl Into<String>,
        class_url: impl Into<String>,
        class_name: impl Into<String>,
        cron_expression: impl Into<String>,
        job_param: impl Into<String>,
        shard_tag: Option<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            trigger_name: trigger_name.into(),
            class_url: class_url.into(),
            class_name: class_name.into(),
            cron_expression: cron_expression.into(),
            job_param: job_param.into(),
            shard_tag,
            created_by: String::new(),
            created_date: DateTime::UNIX_EPOCH,
            updated_by: String::new(),
            updated_date: DateTime::UNIX_EPOCH,
        }
    }
}

/// Caller-supplied payload for registering a single job.
///
/// `job_name` may be blank; the registry then derives a unique key from the
/// cron expression. There is no trigger field: the trigger name always
/// mirrors the resolved job name.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmission {
    #[serde(default)]
    pub job_name: String,
    pub class_url: String,
    pub class_name: String,
    pub cron_expression: String,
    #[serde(default)]
    pub job_param: String,
    #[serde(default)]
    pub shard_tag: Option<String>,
}

/// One logged missed/failed execution event.
///
/// `job_name` is a weak reference: deleting the job definition does not
/// delete or invalidate its compensation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationRecord {
    pub job_name: String,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub updated_by: String,
    pub updated_date: DateTime<Utc>,
}

impl CompensationRecord {
    /// Build a record with placeholder audit fields; the store stamps them.
    pub fn for_job(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            created_by: String::new(),
            created_date: DateTime::UNIX_EPOCH,
            updated_by: String::new(),
            updated_date: DateTime::UNIX_EPOCH,
        }
    }
}

/// External projection of a job definition with audit fields stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub class_url: String,
    pub class_name: String,
    pub job_name: String,
    pub trigger_name: String,
    pub cron_expression: String,
    pub job_param: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_tag: Option<String>,
}

impl From<&JobDefinition> for JobView {
    fn from(def: &JobDefinition) -> Self {
        Self {
            class_url: def.class_url.clone(),
            class_name: def.class_name.clone(),
            job_name: def.job_name.clone(),
            trigger_name: def.trigger_name.clone(),
            cron_expression: def.cron_expression.clone(),
            job_param: def.job_param.clone(),
            shard_tag: def.shard_tag.clone(),
        }
    }
}
