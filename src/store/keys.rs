/// Key layout and encoding utilities for Fjall partitions
///
/// Partition structure:
/// - `jobs`: job:{job_name} -> JobDefinition (JSON)
/// - `compensations`: {seq:u64 big-endian} -> CompensationRecord (JSON)
/// - `metadata`: comp_seq -> u64 big-endian (next compensation sequence)

/// Metadata key holding the next compensation sequence number.
pub const COMP_SEQ_KEY: &[u8] = b"comp_seq";

/// Encode a job key: job:{job_name}
pub fn encode_job_key(job_name: &str) -> Vec<u8> {
    format!("job:{}", job_name).into_bytes()
}

/// Decode a job key: job:{job_name} -> job_name
pub fn decode_job_key(key: &[u8]) -> Option<String> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.strip_prefix("job:").map(String::from)
}

/// Encode a compensation key as a big-endian sequence number.
///
/// Big-endian keys keep the partition iterable in insertion order.
pub fn encode_comp_key(seq: u64) -> [u8; 8] {
    seq.to_be_bytes()
}

/// Decode a compensation key back to its sequence number.
pub fn decode_comp_key(key: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = key.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}
