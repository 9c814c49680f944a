//! # Vela Error Handling
//!
//! Error values that carry a business code, a message, and the call stack
//! present at the moment of creation — with the stack cost amortized across
//! a process-wide, lock-free fingerprint cache so a coded, full-stack error
//! costs close to a plain message-only error.
//!
//! ## Quick Start
//!
//! ```rust
//! use vela_error::prelude::*;
//!
//! fn load(port: u32) -> Result<()> {
//!     ensure!(port >= 1024, coded!(20, "privileged port {}", port));
//!     Ok(())
//! }
//!
//! let err = load(80).unwrap_err();
//! assert_eq!(err.code().raw(), 20);
//! assert!(err.render_text().starts_with("20, privileged port 80;"));
//! ```
//!
//! ## How the cost model works
//!
//! Creating an error walks raw return addresses into a bounded
//! [`StackFingerprint`] (no symbolication, no allocation) and resolves it
//! through the process-wide [`FingerprintCache`]: the first error at a call
//! site pays for symbolication and for precomputing every length and escape
//! decision the renderers need; every later error at that site gets the
//! shared, pre-formatted [`ResolvedStack`] from one lock-free load. The
//! cache is grow-only — bounded by distinct call sites, not call volume —
//! and never evicts.
//!
//! ## Raising and recovering
//!
//! ```rust
//! use vela_error::prelude::*;
//!
//! vela_error::install_panic_filter();
//! let out = with_recovery(|| {
//!     must!(false, coded!(7, "invariant broken"));
//! });
//! assert_eq!(out.unwrap_err().code().raw(), 7);
//! ```

// === Capture, resolution, cache ===
pub mod trace;

// === Error values and chains ===
pub mod core;

// === Assertion / recovery bridge ===
mod bridge;
mod guard;

// === Ergonomic macros ===
pub mod macros;

// === Shared render primitives ===
mod render;

// === Public API Exports ===

/// Main error type.
pub use crate::core::VelaError;

/// Business error code with the `NONE` sentinel.
pub use crate::core::ErrorCode;

/// Result type alias for `Result<T, VelaError>`.
pub use crate::core::Result;

/// Breadcrumb chains and the recursive chain renderer.
pub use crate::core::{Breadcrumb, Unwrapped, WrapChain, render_error_chain_json, wrap, wrap_foreign};

/// Extension traits for wrapping results.
pub use crate::core::{ResultExt, VelaResultExt};

/// Capture and resolution surface consumed by logging adapters.
pub use trace::{FingerprintCache, MAX_DEPTH, ResolveOptions, ResolvedFrame, ResolvedStack, StackFingerprint, Tracer, capture};

/// Assertion predicates and recovery boundaries.
pub use bridge::{
    install_panic_filter, must, must_absent, must_none, must_ok, raise, recover_into,
    with_recovery,
};

/// Per-thread boundary registry and unhandled-raise policy.
pub use guard::{BoundaryGuard, BoundaryRegistry, UnhandledRaise};

/// Convenient prelude with everything you need.
pub mod prelude {
    pub use crate::{
        ErrorCode, Result, ResultExt, Unwrapped, VelaError, VelaResultExt, WrapChain, must,
        raise, with_recovery, wrap, wrap_foreign,
    };

    pub use crate::{coded, ensure, generic};
}
