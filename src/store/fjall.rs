use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info};

use crate::model::{CompensationRecord, JobDefinition};

use super::JobStore;
use super::error::Result;
use super::keys::{COMP_SEQ_KEY, decode_comp_key, decode_job_key, encode_comp_key, encode_job_key};

/// Fjall-backed persistent storage for job definitions and compensation records
#[derive(Clone)]
pub struct FjallJobStore {
    keyspace: Keyspace,
    jobs: PartitionHandle,
    compensations: PartitionHandle,
    metadata: PartitionHandle,
    comp_seq: Arc<AtomicU64>,
}

impl FjallJobStore {
    /// Open or create a Fjall store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening job store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let jobs = keyspace.open_partition("jobs", PartitionCreateOptions::default())?;
        let compensations =
            keyspace.open_partition("compensations", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        // Restore the compensation sequence counter after a restart. Racing
        // appenders can persist their counter writes out of order, so the
        // metadata value may lag the partition; the last written key is the
        // authority. Taking the max keeps the counter monotonic and stops a
        // reused sequence from overwriting an existing record.
        let persisted_seq = metadata
            .get(COMP_SEQ_KEY)?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);
        let tail_seq = compensations
            .iter()
            .next_back()
            .transpose()?
            .and_then(|(key, _value)| decode_comp_key(&key))
            .map(|seq| seq + 1)
            .unwrap_or(0);
        let comp_seq = persisted_seq.max(tail_seq);

        info!(comp_seq, "Job store opened");
        Ok(Self {
            keyspace,
            jobs,
            compensations,
            metadata,
            comp_seq: Arc::new(AtomicU64::new(comp_seq)),
        })
    }

    /// Read every compensation record in insertion order.
    pub fn list_compensations(&self) -> Result<Vec<CompensationRecord>> {
        let mut records = Vec::new();
        for item in self.compensations.iter() {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    /// Get internal statistics (for debugging/monitoring)
    pub fn stats(&self) -> Result<StoreStats> {
        let mut job_count = 0;
        let mut compensation_count = 0;

        for item in self.jobs.iter() {
            item?;
            job_count += 1;
        }

        for item in self.compensations.iter() {
            item?;
            compensation_count += 1;
        }

        Ok(StoreStats {
            job_count,
            compensation_count,
        })
    }

    fn get_definition(&self, job_name: &str) -> Result<Option<JobDefinition>> {
        let key = encode_job_key(job_name);
        match self.jobs.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Preserve the created audit stamp of an existing row; for a fresh row
    /// the created fields inherit the element's updated stamp.
    fn carry_created_stamp(&self, def: &mut JobDefinition) -> Result<()> {
        match self.get_definition(&def.job_name)? {
            Some(existing) => {
                def.created_by = existing.created_by;
                def.created_date = existing.created_date;
            }
            None => {
                def.created_by = def.updated_by.clone();
                def.created_date = def.updated_date;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for FjallJobStore {
    async fn list_all(&self) -> Result<Vec<JobDefinition>> {
        let mut definitions = Vec::new();
        for item in self.jobs.iter() {
            let (_key, value) = item?;
            definitions.push(serde_json::from_slice(&value)?);
        }
        debug!(count = definitions.len(), "Listed all job definitions");
        Ok(definitions)
    }

    async fn find_by_name(&self, job_name: &str) -> Result<Option<JobDefinition>> {
        self.get_definition(job_name)
    }

    async fn find_by_names(&self, job_names: &HashSet<String>) -> Result<Vec<JobDefinition>> {
        let mut definitions = Vec::new();
        for name in job_names {
            // Misses are silently omitted
            if let Some(def) = self.get_definition(name)? {
                definitions.push(def);
            }
        }
        Ok(definitions)
    }

    async fn save(&self, mut def: JobDefinition, actor: &str) -> Result<JobDefinition> {
        def.updated_by = actor.to_string();
        def.updated_date = Utc::now();
        self.carry_created_stamp(&mut def)?;

        let key = encode_job_key(&def.job_name);
        let value = serde_json::to_vec(&def)?;
        self.jobs.insert(key, value)?;
        debug!(job_name = %def.job_name, actor, "Upserted job definition");
        Ok(def)
    }

    async fn save_batch(&self, defs: Vec<JobDefinition>) -> Result<Vec<JobDefinition>> {
        let mut batch = self.keyspace.batch();
        let mut saved = Vec::with_capacity(defs.len());

        for mut def in defs {
            self.carry_created_stamp(&mut def)?;
            let key = encode_job_key(&def.job_name);
            batch.insert(&self.jobs, key, serde_json::to_vec(&def)?);
            saved.push(def);
        }

        // Single atomic commit: all elements land or none do
        batch.commit()?;
        debug!(count = saved.len(), "Upserted job definition batch");
        Ok(saved)
    }

    async fn delete_by_name(&self, job_name: &str) -> Result<()> {
        let key = encode_job_key(job_name);
        self.jobs.remove(key)?;
        debug!(job_name, "Deleted job definition");
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut keys = Vec::new();
        for item in self.jobs.iter() {
            let (key, _value) = item?;
            keys.push(key);
        }
        let count = keys.len();
        for key in keys {
            if let Some(job_name) = decode_job_key(&key) {
                debug!(job_name = %job_name, "Deleting job definition");
            }
            self.jobs.remove(key)?;
        }
        info!(count, "Deleted all job definitions");
        Ok(())
    }

    async fn save_compensation(
        &self,
        mut record: CompensationRecord,
        actor: &str,
    ) -> Result<CompensationRecord> {
        let now = Utc::now();
        record.created_by = actor.to_string();
        record.created_date = now;
        record.updated_by = actor.to_string();
        record.updated_date = now;

        let seq = self.comp_seq.fetch_add(1, Ordering::SeqCst);
        let value = serde_json::to_vec(&record)?;
        self.compensations.insert(encode_comp_key(seq), value)?;
        // Persist the counter for crash recovery
        self.metadata
            .insert(COMP_SEQ_KEY, (seq + 1).to_be_bytes())?;

        debug!(seq, job_name = %record.job_name, "Recorded compensation");
        Ok(record)
    }
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub job_count: usize,
    pub compensation_count: usize,
}
