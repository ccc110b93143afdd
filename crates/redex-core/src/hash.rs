//! Structural fingerprints.
//!
//! Composite fingerprints are memoized per node in a [`HashCache`]. Both
//! slots use `0` as the "not computed" sentinel; a digest that happens to be
//! zero is remapped so it can never be confused with an empty slot. Racing
//! writers always store the same value, so first-writer-wins needs no lock.

use std::sync::atomic::{AtomicU64, Ordering};

use xxhash_rust::xxh64::{xxh64, Xxh64};

use crate::expr::{Ex, Expression};

const EXPR_DOMAIN: [u8; 8] = [72, 5, 244, 86, 5, 210, 69, 30];
const SYMBOL_DOMAIN: [u8; 8] = [107, 10, 204, 21, 209, 216, 0, 107];
const INTEGER_DOMAIN: [u8; 8] = [242, 99, 84, 113, 102, 46, 118, 94];
const REAL_DOMAIN: [u8; 8] = [17, 180, 63, 9, 221, 140, 38, 201];
const STRING_DOMAIN: [u8; 8] = [102, 82, 93, 170, 109, 167, 53, 165];

const ZERO_REMAP: u64 = 0x9e37_79b9_7f4a_7c15;

fn nonzero(h: u64) -> u64 {
    if h == 0 { ZERO_REMAP } else { h }
}

fn hash_atom(domain: &[u8; 8], payload: &[u8]) -> u64 {
    let mut h = Xxh64::new(0);
    h.update(domain);
    h.update(payload);
    nonzero(h.digest())
}

fn hash_parts<'a>(parts: impl Iterator<Item = &'a Ex>) -> u64 {
    let mut h = Xxh64::new(0);
    h.update(&EXPR_DOMAIN);
    for part in parts {
        h.update(&part.hash64().to_le_bytes());
    }
    nonzero(h.digest())
}

/// Combines a structural fingerprint with a definition generation. Used to
/// stamp nodes that reached normal form under a given rule table.
pub fn evaluation_stamp(hash: u64, generation: u64) -> u64 {
    nonzero(xxh64(&generation.to_le_bytes(), hash))
}

#[derive(Debug, Default)]
pub struct HashCache {
    cached: AtomicU64,
    evaled: AtomicU64,
}

impl HashCache {
    pub fn cached(&self) -> Option<u64> {
        match self.cached.load(Ordering::Acquire) {
            0 => None,
            h => Some(h),
        }
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        if let Some(h) = self.cached() {
            return h;
        }
        let h = nonzero(compute());
        self.cached.store(h, Ordering::Release);
        h
    }

    pub fn evaled(&self) -> Option<u64> {
        match self.evaled.load(Ordering::Acquire) {
            0 => None,
            h => Some(h),
        }
    }

    pub fn set_evaled(&self, stamp: u64) { self.evaled.store(nonzero(stamp), Ordering::Release); }

    pub fn clear(&mut self) {
        *self.cached.get_mut() = 0;
        *self.evaled.get_mut() = 0;
    }

    pub(crate) fn snapshot(&self) -> Self {
        Self {
            cached: AtomicU64::new(self.cached.load(Ordering::Acquire)),
            evaled: AtomicU64::new(self.evaled.load(Ordering::Acquire)),
        }
    }
}

impl Ex {
    /// Structural fingerprint. Terms that are `same_q` hash identically.
    pub fn hash64(&self) -> u64 {
        match self {
            Ex::Expr(e) => e.hash64(),
            Ex::Symbol(s) => hash_atom(&SYMBOL_DOMAIN, s.name().as_bytes()),
            Ex::Integer(n) => hash_atom(&INTEGER_DOMAIN, &n.to_le_bytes()),
            Ex::Real(f) => hash_atom(&REAL_DOMAIN, &f.to_bits().to_le_bytes()),
            Ex::String(s) => hash_atom(&STRING_DOMAIN, s.as_bytes()),
        }
    }
}

impl Expression {
    pub fn hash64(&self) -> u64 { self.cache.get_or_compute(|| hash_parts(self.parts())) }

    /// The memoized fingerprint, if one has been computed since the last
    /// mutation.
    pub fn cached_hash(&self) -> Option<u64> { self.cache.cached() }

    pub fn evaled_hash(&self) -> Option<u64> { self.cache.evaled() }

    /// Records that this node is in normal form for `stamp`. Takes `&self`
    /// so that shared nodes can be stamped.
    pub fn mark_evaluated(&self, stamp: u64) { self.cache.set_evaled(stamp); }

    /// Whether this node was stamped with `stamp` and has not been mutated
    /// since.
    pub fn is_evaluated_under(&self, stamp: u64) -> bool { self.cache.evaled() == Some(nonzero(stamp)) }
}
