//! # Vela Log
//!
//! Tracing setup plus resolved-caller enrichment for the vela error core.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vela_log::prelude::*;
//!
//! fn main() -> vela_log::LogResult<()> {
//!     vela_log::init()?;
//!     info_caller!(port = 8080, "server starting");
//!     Ok(())
//! }
//! ```
//!
//! The caller field costs one single-frame capture and one lock-free cache
//! load per record once the call site is warm — the enrichment rides the
//! same fingerprint cache the error values use.

mod builder;
mod caller;
mod error;
mod macros;

// Public API
pub use builder::LoggerBuilder;
pub use caller::{caller, caller_or_unknown};
pub use error::{LogError, LogResult};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{LogResult, LoggerBuilder, caller, caller_or_unknown};
    pub use crate::{debug_caller, error_caller, info_caller, warn_caller};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export tracing macros for crates that take their logging through here.
pub use tracing::{debug, error, info, span, trace, warn};

/// Install the default logger: `info` filter, human-readable output.
pub fn init() -> LogResult<()> {
    LoggerBuilder::new().try_init()
}

/// Install a logger honoring the given filter expression.
pub fn init_with(filter: &str) -> LogResult<()> {
    LoggerBuilder::new().filter(filter).try_init()
}
