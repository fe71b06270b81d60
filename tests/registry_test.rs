//! Integration tests for the job registry façade.
//!
//! These exercise the full composition (registry + fjall store + cache),
//! including the documented store/cache divergence window.

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;

use cronreg::model::{CompensationRecord, JobDefinition, JobSubmission};
use cronreg::registry::{CacheOp, JobRegistry};
use cronreg::store::FjallJobStore;

fn open_registry() -> (JobRegistry, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FjallJobStore::open(temp_dir.path().join("registry")).unwrap();
    (JobRegistry::new(Arc::new(store)), temp_dir)
}

fn submission(job_name: &str, cron: &str) -> JobSubmission {
    JobSubmission {
        job_name: job_name.to_string(),
        class_url: "http://repo.example.com/jobs.jar".to_string(),
        class_name: "com.example.ReportJob".to_string(),
        cron_expression: cron.to_string(),
        job_param: "{}".to_string(),
        shard_tag: None,
    }
}

fn definition(job_name: &str) -> JobDefinition {
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

#[tokio::test]
async fn test_blank_name_registrations_never_collide() {
    // Scenario A: two blank names, identical cron
    let (registry, _temp) = open_registry();

    let first = registry
        .register(submission("", "0 0 * * * ?"), "alice")
        .await
        .unwrap();
    let second = registry
        .register(submission("", "0 0 * * * ?"), "alice")
        .await
        .unwrap();

    assert_ne!(first.job_name, second.job_name);
    assert_eq!(registry.list_all("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_register_resolves_trigger_name() {
    let (registry, _temp) = open_registry();

    let named = registry
        .register(submission("nightly_report", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    assert_eq!(named.trigger_name, "nightly_report");

    let anonymous = registry
        .register(submission("", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    assert_eq!(anonymous.trigger_name, anonymous.job_name);
    assert!(anonymous.job_name.contains('_'));
}

#[tokio::test]
async fn test_list_all_refreshes_cache_exactly() {
    // Scenario B: batch of 3, then refresh
    let (registry, _temp) = open_registry();

    registry
        .register_batch(
            vec![definition("job_a"), definition("job_b"), definition("job_c")],
            "alice",
        )
        .await
        .unwrap();
    assert!(registry.list_cached().is_empty());

    registry.list_all("alice").await.unwrap();

    let cached = registry.list_cached();
    let cached_names: HashSet<&str> = cached.iter().map(|d| d.job_name.as_str()).collect();
    assert_eq!(cached_names, HashSet::from(["job_a", "job_b", "job_c"]));
}

#[tokio::test]
async fn test_cache_lags_store_until_refresh() {
    // Scenario C: delete without a refresh, cache keeps the stale entry
    let (registry, _temp) = open_registry();

    registry
        .register_batch(
            vec![definition("job_a"), definition("job_b"), definition("job_c")],
            "alice",
        )
        .await
        .unwrap();
    registry.list_all("alice").await.unwrap();

    registry.remove_job("job_b").await.unwrap();

    // No intervening refresh: the deleted job is still served from cache
    assert_eq!(registry.list_cached().len(), 3);

    registry.list_all("alice").await.unwrap();
    let cached = registry.list_cached();
    assert_eq!(cached.len(), 2);
    assert!(!cached.iter().any(|d| d.job_name == "job_b"));
}

#[tokio::test]
async fn test_get_jobs_omits_absent_names() {
    // Scenario D
    let (registry, _temp) = open_registry();
    registry
        .register(submission("present", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();

    let names: HashSet<String> = ["present".to_string(), "absent".to_string()].into();
    let found = registry.get_jobs(&names).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].job_name, "present");
}

#[tokio::test]
async fn test_get_job_miss_is_none() {
    let (registry, _temp) = open_registry();
    assert!(registry.get_job("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_restamps_updated_and_preserves_created() {
    let (registry, _temp) = open_registry();

    let originals = registry
        .register_batch(vec![definition("job_a"), definition("job_b")], "alice")
        .await
        .unwrap();

    let resaved = registry
        .register_batch(vec![definition("job_a"), definition("job_b")], "bob")
        .await
        .unwrap();

    for def in &resaved {
        let original = originals
            .iter()
            .find(|d| d.job_name == def.job_name)
            .unwrap();
        assert_eq!(def.created_by, "alice");
        assert_eq!(def.created_date, original.created_date);
        assert_eq!(def.updated_by, "bob");
    }
    // One actor/time for the whole batch
    assert_eq!(resaved[0].updated_date, resaved[1].updated_date);
}

#[tokio::test]
async fn test_toggle_cache_roundtrip_restores_membership() {
    let (registry, _temp) = open_registry();
    let def = registry
        .register(submission("toggled", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();

    let before = registry.list_cached().len();

    registry.toggle_cache(&def, CacheOp::Add);
    assert_eq!(registry.list_cached().len(), before + 1);

    registry.toggle_cache(&def, CacheOp::Remove);
    assert_eq!(registry.list_cached().len(), before);
}

#[tokio::test]
async fn test_toggle_cache_add_skips_duplicates() {
    let (registry, _temp) = open_registry();
    let def = registry
        .register(submission("solo", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();

    registry.toggle_cache(&def, CacheOp::Add);
    registry.toggle_cache(&def, CacheOp::Add);

    assert_eq!(registry.list_cached().len(), 1);
}

#[tokio::test]
async fn test_concurrent_toggle_add_keeps_single_entry() {
    use std::sync::Barrier;

    let (registry, _temp) = open_registry();
    let def = registry
        .register(submission("same_job", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    let registry = Arc::new(registry);

    for _ in 0..300 {
        let barrier = Arc::new(Barrier::new(8));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let def = def.clone();
            handles.push(std::thread::spawn(move || {
                barrier.wait();
                registry.toggle_cache(&def, CacheOp::Add);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Never two cache entries for one job name, no matter how adds race
        assert_eq!(registry.list_cached().len(), 1);
        registry.toggle_cache(&def, CacheOp::Remove);
    }
}

#[tokio::test]
async fn test_paired_variants_keep_cache_in_step() {
    let (registry, _temp) = open_registry();

    let def = registry
        .register_cached(submission("paired", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    assert_eq!(registry.list_cached().len(), 1);
    assert!(registry.get_job(&def.job_name).await.unwrap().is_some());

    registry.remove_job_cached(&def.job_name).await.unwrap();
    assert!(registry.list_cached().is_empty());
    assert!(registry.get_job(&def.job_name).await.unwrap().is_none());
}

#[tokio::test]
async fn test_purges_are_independent() {
    let (registry, _temp) = open_registry();
    registry
        .register_batch(vec![definition("job_a"), definition("job_b")], "alice")
        .await
        .unwrap();
    registry.list_all("alice").await.unwrap();

    registry.purge_all_jobs().await.unwrap();
    // Store is empty, cache still holds the old snapshot
    assert_eq!(registry.list_cached().len(), 2);
    assert!(registry.list_all("alice").await.unwrap().is_empty());

    registry
        .register(submission("job_c", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    registry.list_all("alice").await.unwrap();
    registry.purge_cache();
    // Cache is empty, store still holds the job
    assert!(registry.list_cached().is_empty());
    assert_eq!(registry.list_all("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_view_projection_strips_audit() {
    let (registry, _temp) = open_registry();
    let def = registry
        .register(submission("viewed", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();

    let view = JobRegistry::to_view(&def);
    assert_eq!(view.job_name, "viewed");
    assert_eq!(view.cron_expression, "0 0 2 * * ?");

    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("created_by").is_none());
    assert!(json.get("updated_date").is_none());
}

#[tokio::test]
async fn test_record_compensation_and_metrics() {
    let (registry, _temp) = open_registry();

    let record = registry
        .record_compensation(CompensationRecord::for_job("nightly_report"), "scheduler")
        .await
        .unwrap();
    assert_eq!(record.created_by, "scheduler");
    assert_eq!(record.created_date, record.updated_date);

    registry
        .register(submission("job_a", "0 0 2 * * ?"), "alice")
        .await
        .unwrap();
    registry.remove_job("job_a").await.unwrap();
    registry.list_all("alice").await.unwrap();

    let metrics = registry.metrics();
    assert_eq!(metrics.compensations_recorded, 1);
    assert_eq!(metrics.jobs_saved, 1);
    assert_eq!(metrics.jobs_deleted, 1);
    assert_eq!(metrics.cache_refreshes, 1);
}

#[tokio::test]
async fn test_shared_registry_across_tasks() {
    let (registry, _temp) = open_registry();
    let registry = Arc::new(registry);

    let mut handles = Vec::new();
    for i in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .register(submission(&format!("job_{i}"), "0 0 2 * * ?"), "alice")
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // A reader polling the cache while writers refresh must always see a
    // consistent snapshot
    let reader = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            for _ in 0..20 {
                let snapshot = registry.list_cached();
                assert!(snapshot.len() <= 8);
                tokio::task::yield_now().await;
            }
        })
    };
    registry.list_all("alice").await.unwrap();
    reader.await.unwrap();

    assert_eq!(registry.list_cached().len(), 8);
}
