//! Resolved-caller enrichment.
//!
//! Built strictly on the two functions the error core exposes to logging
//! adapters: `capture(skip)` for a fingerprint and the tracer's cached
//! fingerprint → top-frame resolution. Warm call sites cost one raw
//! single-frame walk plus one lock-free cache load per record.

use vela_error::{Tracer, capture};

/// Frames between the caller of this module's functions and the capture.
const ADAPTER_SKIP: usize = 1;

/// The `"file:line"` of the call site `skip` frames above the caller, when
/// it resolves.
pub fn caller(skip: usize) -> Option<String> {
    let fingerprint = capture(skip + ADAPTER_SKIP, 1);
    Tracer::global().resolve_caller(&fingerprint)
}

/// Like [`caller`], with a `"??:0"` placeholder when resolution fails, so
/// log records always carry the field.
pub fn caller_or_unknown(skip: usize) -> String {
    caller(skip).unwrap_or_else(|| String::from("??:0"))
}
