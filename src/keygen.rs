//! Job key derivation for anonymous registrations.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive the job key for a registration.
///
/// A non-blank caller-supplied name is returned unchanged. For a blank name
/// the key is `<uniqueToken>_<cronHash>`: a fresh UUIDv4 token concatenated
/// with the SHA-256 hex of the cron expression. Collision resistance comes
/// from the random token, not the hash; the hash only makes keys for the
/// same schedule recognizable in listings.
pub fn derive_job_key(job_name: &str, cron_expression: &str) -> String {
    if !job_name.trim().is_empty() {
        return job_name.to_string();
    }
    let cron_hash = Sha256::digest(cron_expression.as_bytes());
    format!("{}_{:x}", Uuid::new_v4().simple(), cron_hash)
}
