//! Job registry for a cron-style task scheduler.
//!
//! Persists job definitions, mirrors them in an in-process cache for the
//! scheduler runtime, derives keys for anonymous jobs, and records
//! compensation events for missed or failed executions. The entry point for
//! callers is [`registry::JobRegistry`]; the cron-firing engine itself lives
//! outside this crate and only reads the cache.

pub mod cache;
pub mod compensation;
pub mod config;
pub mod keygen;
pub mod model;
pub mod observability;
pub mod registry;
pub mod store;
