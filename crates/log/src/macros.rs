//! Event macros that attach a resolved `caller` field.

/// `tracing::info!` with a `caller = "file:line"` field for this call site.
///
/// ```rust
/// vela_log::info_caller!(port = 8080, "server starting");
/// ```
#[macro_export]
macro_rules! info_caller {
    ($($arg:tt)*) => {
        ::tracing::info!(caller = %$crate::caller_or_unknown(0), $($arg)*)
    };
}

/// `tracing::warn!` with a `caller = "file:line"` field for this call site.
#[macro_export]
macro_rules! warn_caller {
    ($($arg:tt)*) => {
        ::tracing::warn!(caller = %$crate::caller_or_unknown(0), $($arg)*)
    };
}

/// `tracing::error!` with a `caller = "file:line"` field for this call site.
#[macro_export]
macro_rules! error_caller {
    ($($arg:tt)*) => {
        ::tracing::error!(caller = %$crate::caller_or_unknown(0), $($arg)*)
    };
}

/// `tracing::debug!` with a `caller = "file:line"` field for this call site.
#[macro_export]
macro_rules! debug_caller {
    ($($arg:tt)*) => {
        ::tracing::debug!(caller = %$crate::caller_or_unknown(0), $($arg)*)
    };
}
