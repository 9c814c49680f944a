//! The tracer service: capture policy + cache, bundled and injectable.
//!
//! Global state is deliberately modeled as a swappable service instance
//! rather than loose statics: production code uses [`Tracer::global`], tests
//! construct their own `Tracer` (or [`install`](Tracer::install) a fresh one
//! and [`reset`](Tracer::reset) afterwards) so cache contents never leak
//! between isolated test cases.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::trace::cache::FingerprintCache;
use crate::trace::fingerprint::StackFingerprint;
use crate::trace::resolve::{ResolveOptions, ResolvedStack, resolve_fingerprint};

/// Resolves fingerprints through a process-wide cache.
#[derive(Debug, Default)]
pub struct Tracer {
    cache: FingerprintCache,
    options: ResolveOptions,
}

impl Tracer {
    /// Tracer with the given symbolication options and an empty cache.
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            cache: FingerprintCache::new(),
            options,
        }
    }

    /// The process-wide default tracer.
    pub fn global() -> Arc<Tracer> {
        global_cell().load_full()
    }

    /// Replace the process-wide tracer. Existing errors keep the stacks they
    /// already resolved; only future resolution goes through `tracer`.
    pub fn install(tracer: Tracer) {
        global_cell().store(Arc::new(tracer));
    }

    /// Restore the default process-wide tracer with an empty cache.
    pub fn reset() {
        global_cell().store(Arc::new(Tracer::default()));
    }

    /// The backing cache.
    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// The symbolication options in effect.
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve a fingerprint to its shared, pre-formatted stack.
    ///
    /// Cache hit: one lock-free snapshot load. Cache miss: symbolicate,
    /// publish, return the published value. Concurrent misses on the same
    /// fingerprint resolve redundantly but converge on one entry.
    pub fn resolve(&self, fingerprint: &StackFingerprint) -> Arc<ResolvedStack> {
        if fingerprint.is_empty() {
            return ResolvedStack::shared_empty();
        }
        self.cache.get_or_insert_with(fingerprint, || {
            Arc::new(resolve_fingerprint(fingerprint, &self.options))
        })
    }

    /// The `"file:line"` of the fingerprint's innermost frame, for logging
    /// adapters that attach a caller field to their own records.
    pub fn resolve_caller(&self, fingerprint: &StackFingerprint) -> Option<String> {
        self.resolve(fingerprint)
            .frames()
            .first()
            .map(super::resolve::ResolvedFrame::caller)
    }
}

fn global_cell() -> &'static ArcSwap<Tracer> {
    static GLOBAL: OnceLock<ArcSwap<Tracer>> = OnceLock::new();
    GLOBAL.get_or_init(|| ArcSwap::from_pointee(Tracer::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fingerprint_resolves_to_shared_empty() {
        let tracer = Tracer::default();
        let stack = tracer.resolve(&StackFingerprint::default());
        assert!(stack.is_empty());
        assert!(tracer.cache().is_empty(), "empty stacks are not cached");
    }

    #[test]
    fn resolution_is_memoized() {
        let tracer = Tracer::default();
        let fp = crate::trace::capture(0, 4);
        let a = tracer.resolve(&fp);
        let b = tracer.resolve(&fp);
        assert!(Arc::ptr_eq(&a, &b));
        if !fp.is_empty() {
            assert_eq!(tracer.cache().len(), 1);
        }
    }

    #[test]
    fn instances_are_isolated() {
        let a = Tracer::default();
        let b = Tracer::default();
        let fp = crate::trace::capture(0, 2);
        a.resolve(&fp);
        assert!(b.cache().is_empty());
    }
}
