//! Deterministic seed derivation.
//!
//! Sub-seeds are derived with SipHash-1-3 under fixed zero keys, which is
//! stable across runs, platforms, and compiler releases (unlike std's
//! `DefaultHasher`, whose algorithm is unspecified).

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Derive an independent sub-seed from a seed and a string salt.
///
/// Hashes the little-endian seed bytes followed by the salt bytes. Pure
/// integer arithmetic: no floating point, no iteration-order dependence.
pub fn seed_hash(seed: u64, salt: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(&seed.to_le_bytes());
    hasher.write(salt.as_bytes());
    hasher.finish()
}

/// Build a run identifier from a timestamp (e.g. nanoseconds since the epoch).
///
/// Returns 16 lowercase hex digits.
pub fn derive_run_id(timestamp: u128) -> String {
    let low = timestamp as u64;
    let high = (timestamp >> 64) as u64;
    format!("{:016x}", seed_hash(low ^ high.rotate_left(32), "run_id"))
}
