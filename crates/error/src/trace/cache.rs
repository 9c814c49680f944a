//! Process-wide fingerprint cache.
//!
//! The cache is a read-mostly map from [`StackFingerprint`] to its resolved,
//! pre-formatted stack. Reads load an immutable snapshot and never block or
//! retry. Writes clone the current snapshot, fold the new entry in, and
//! publish the result with a compare-and-swap, retrying on contention. The
//! O(n) copy per insert is acceptable because distinct fingerprints are
//! bounded by the program's distinct call sites, not by call volume — after
//! warm-up, inserts are rare.
//!
//! The cache only grows. Entries are never evicted: eviction would reintroduce
//! the resolution cost this design exists to eliminate, and memory is bounded
//! by the number of call sites actually exercised.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::trace::fingerprint::StackFingerprint;
use crate::trace::resolve::ResolvedStack;

type Snapshot = HashMap<StackFingerprint, Arc<ResolvedStack>>;

/// Lock-free, grow-only map from fingerprint to resolved stack.
#[derive(Debug)]
pub struct FingerprintCache {
    snapshot: ArcSwap<Snapshot>,
}

impl FingerprintCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Look up a fingerprint in the current snapshot. Never blocks.
    pub fn get(&self, fingerprint: &StackFingerprint) -> Option<Arc<ResolvedStack>> {
        self.snapshot.load().get(fingerprint).cloned()
    }

    /// Publish an entry.
    ///
    /// Load–fold–compare-and-swap loop: on a lost race the (now newer)
    /// snapshot is reloaded and the entry folded in again. A fingerprint that
    /// raced in first wins; losing a race only wastes the redundant
    /// resolution, which is pure and idempotent.
    pub fn insert(&self, fingerprint: StackFingerprint, stack: Arc<ResolvedStack>) {
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.entry(fingerprint.clone())
                .or_insert_with(|| Arc::clone(&stack));
            next
        });
        tracing::trace!(
            entries = self.len(),
            frames = stack.len(),
            "fingerprint cache insert"
        );
    }

    /// Cached stack for `fingerprint`, resolving with `make` on a miss.
    ///
    /// Returns the published value, so concurrent resolvers of the same
    /// fingerprint converge on one shared stack.
    pub fn get_or_insert_with(
        &self,
        fingerprint: &StackFingerprint,
        make: impl FnOnce() -> Arc<ResolvedStack>,
    ) -> Arc<ResolvedStack> {
        if let Some(hit) = self.get(fingerprint) {
            return hit;
        }
        let stack = make();
        self.insert(fingerprint.clone(), Arc::clone(&stack));
        // The cache is grow-only, so the entry is visible now; fall back to
        // our own copy only if a reset raced us.
        self.get(fingerprint).unwrap_or(stack)
    }

    /// Number of cached fingerprints.
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Drop every entry. Test-isolation hook, not part of steady-state
    /// operation (the cache is grow-only by design).
    pub fn clear(&self) {
        self.snapshot.store(Arc::new(Snapshot::new()));
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}
