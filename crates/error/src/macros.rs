//! Ergonomic constructor and assertion macros.

/// Create a coded error with the stack captured at the call site.
///
/// # Examples
///
/// ```rust
/// use vela_error::coded;
///
/// let err = coded!(404, "page missing");
/// let err = coded!(404, "missing: {}", "/index");
/// assert_eq!(err.code().raw(), 404);
/// ```
#[macro_export]
macro_rules! coded {
    ($code:expr, $msg:literal) => {
        $crate::VelaError::new($crate::ErrorCode::new($code), $msg)
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::VelaError::new($crate::ErrorCode::new($code), format!($fmt, $($arg)*))
    };
}

/// Create a generic (sentinel-code) error with the stack captured at the
/// call site.
///
/// # Examples
///
/// ```rust
/// use vela_error::generic;
///
/// let err = generic!("unexpected state");
/// let err = generic!("unexpected state: {}", 3);
/// assert!(err.code().is_none());
/// ```
#[macro_export]
macro_rules! generic {
    ($msg:literal) => {
        $crate::VelaError::generic($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::VelaError::generic(format!($fmt, $($arg)*))
    };
}

/// Raise toward the nearest recovery boundary unless the condition holds.
///
/// With one argument the raise carries a generic "not ok" error; with two,
/// the given error.
///
/// # Examples
///
/// ```rust
/// use vela_error::{coded, must, with_recovery};
///
/// let out = with_recovery(|| {
///     must!(1 + 1 == 2);
///     must!(false, coded!(7, "invariant broken"));
/// });
/// assert_eq!(out.unwrap_err().code().raw(), 7);
/// ```
#[macro_export]
macro_rules! must {
    ($cond:expr) => {
        $crate::must($cond)
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            $crate::raise($err);
        }
    };
}

/// Return early with the given error unless the condition holds.
///
/// The `Result`-flavored sibling of [`must!`]: no raising, no boundary —
/// just an ordinary `return Err(...)`.
///
/// # Examples
///
/// ```rust
/// use vela_error::{coded, ensure, Result, VelaError};
///
/// fn check_age(age: u32) -> Result<()> {
///     ensure!(age >= 18, coded!(10, "must be 18+"));
///     Ok(())
/// }
/// assert_eq!(check_age(12).unwrap_err().code().raw(), 10);
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
