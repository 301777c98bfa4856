//! 32-bit FNV-1a, the frame-to-frame identity hash.

pub(crate) const HASH_INITIAL: u32 = 2166136261;
const HASH_MULTIPLIER: u32 = 16777619;

/// Folds `data` into the running hash state `h`.
pub(crate) fn fnv1a(h: &mut u32, data: &[u8]) {
    for &byte in data {
        *h = (*h ^ u32::from(byte)).wrapping_mul(HASH_MULTIPLIER);
    }
}
