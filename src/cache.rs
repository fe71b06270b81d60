//! In-process mirror of the persisted job set.
//!
//! The cache is read far more often (scheduler runtime polling) than it is
//! written, so the contents live behind an [`arc_swap::ArcSwap`]: readers
//! load a snapshot lock-free and never block on a concurrent mutation.
//! Writers serialize on an internal mutex, build the next vector off to the
//! side, and install it with a single atomic swap, so readers never observe
//! a partially-replaced state.
//!
//! The cache is deliberately independent of the store: membership here and
//! membership there can diverge until the next full refresh. Callers own
//! that contract (see [`crate::registry`]).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use crate::model::JobDefinition;

/// Copy-on-write mirror of job definitions for the scheduler runtime.
pub struct JobCache {
    entries: ArcSwap<Vec<JobDefinition>>,
    write_lock: Mutex<()>,
}

impl JobCache {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    // Mutations only ever install a fully-built vector, so a writer that
    // panicked mid-operation cannot have left torn contents behind.
    fn writer(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically discard the current contents and install `definitions`.
    pub fn replace_all(&self, definitions: Vec<JobDefinition>) {
        let _guard = self.writer();
        debug!(count = definitions.len(), "Replacing cache contents");
        self.entries.store(Arc::new(definitions));
    }

    /// Current contents without consulting the store; may be stale.
    pub fn snapshot(&self) -> Arc<Vec<JobDefinition>> {
        self.entries.load_full()
    }

    /// Insert one entry.
    ///
    /// This primitive does not de-duplicate: callers must not add a name
    /// that is already present. A duplicate is logged and still appended so
    /// the defect is visible rather than silently masked.
    pub fn add(&self, definition: JobDefinition) {
        let _guard = self.writer();
        let current = self.entries.load();
        if current.iter().any(|d| d.job_name == definition.job_name) {
            warn!(job_name = %definition.job_name, "Adding duplicate job name to cache");
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(definition);
        self.entries.store(Arc::new(next));
    }

    /// Insert one entry unless its name is already present.
    ///
    /// Membership check and append happen under the same writer lock, so
    /// two concurrent calls for one name cannot both insert. Returns
    /// whether the entry was added.
    pub fn add_if_absent(&self, definition: JobDefinition) -> bool {
        let _guard = self.writer();
        let current = self.entries.load();
        if current.iter().any(|d| d.job_name == definition.job_name) {
            return false;
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(definition);
        self.entries.store(Arc::new(next));
        true
    }

    /// Remove every entry with the given name (defensive against duplicates).
    pub fn remove_by_name(&self, job_name: &str) {
        let _guard = self.writer();
        let current = self.entries.load();
        let next: Vec<JobDefinition> = current
            .iter()
            .filter(|d| d.job_name != job_name)
            .cloned()
            .collect();
        if next.len() == current.len() {
            debug!(job_name, "Cache remove matched no entries");
        }
        self.entries.store(Arc::new(next));
    }

    pub fn clear(&self) {
        let _guard = self.writer();
        self.entries.store(Arc::new(Vec::new()));
    }

    pub fn contains(&self, job_name: &str) -> bool {
        self.entries.load().iter().any(|d| d.job_name == job_name)
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

impl Default for JobCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(job_name: &str) -> JobDefinition {
        JobDefinition::new(
            job_name,
            job_name,
            "http://repo.example.com/jobs.jar",
            "com.example.ReportJob",
            "0 0 2 * * ?",
            "{}",
            None,
        )
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let cache = JobCache::new();
        cache.add(def("old"));

        cache.replace_all(vec![def("a"), def("b")]);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(!cache.contains("old"));
    }

    #[test]
    fn test_snapshot_is_immutable_view() {
        let cache = JobCache::new();
        cache.add(def("a"));
        let before = cache.snapshot();

        cache.add(def("b"));

        // The earlier snapshot is untouched by later mutations
        assert_eq!(before.len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_remove_by_name_removes_all_matches() {
        let cache = JobCache::new();
        cache.add(def("a"));
        cache.add(def("b"));
        cache.add(def("a")); // defect case, still handled

        cache.remove_by_name("a");

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].job_name, "b");
    }

    #[test]
    fn test_remove_absent_name_is_noop() {
        let cache = JobCache::new();
        cache.add(def("a"));
        cache.remove_by_name("ghost");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = JobCache::new();
        cache.add(def("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_add_if_absent_is_exclusive() {
        let cache = JobCache::new();
        assert!(cache.add_if_absent(def("a")));
        assert!(!cache.add_if_absent(def("a")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_add_if_absent_inserts_once() {
        use std::sync::Barrier;

        let cache = Arc::new(JobCache::new());
        for _ in 0..300 {
            cache.clear();
            let barrier = Arc::new(Barrier::new(8));
            let mut handles = Vec::new();
            for _ in 0..8 {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                handles.push(std::thread::spawn(move || {
                    barrier.wait();
                    cache.add_if_absent(def("same_job"));
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(cache.len(), 1);
        }
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(JobCache::new());
        let mut handles = Vec::new();

        for i in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    cache.replace_all(vec![def(&format!("job_{i}_{j}"))]);
                    // Readers must always see a fully-installed vector
                    assert_eq!(cache.snapshot().len(), 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
