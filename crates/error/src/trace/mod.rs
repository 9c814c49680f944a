//! Stack-fingerprint capture, resolution, and the process-wide cache.
//!
//! The pipeline: [`capture`] walks raw return addresses into a
//! [`StackFingerprint`] (cheap, allocation-free, runs on every error);
//! [`Tracer::resolve`] turns a fingerprint into a shared [`ResolvedStack`]
//! through the grow-only [`FingerprintCache`], symbolicating at most once per
//! distinct call-stack shape and precomputing everything the serializers
//! need.

mod cache;
mod fingerprint;
mod resolve;
mod tracer;

pub use cache::FingerprintCache;
pub use fingerprint::{MAX_DEPTH, StackFingerprint, capture};
pub use resolve::{ResolveOptions, ResolvedFrame, ResolvedStack};
pub use tracer::Tracer;
