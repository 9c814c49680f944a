//! Assertion predicates and the recovery boundary.
//!
//! The bridge turns predicate failures into raised [`VelaError`] values and
//! scoped boundaries turn them back into ordinary `Result`s. Raised errors
//! travel as unwinding panics with a crate-private payload type: a boundary
//! downcasts exactly that type and resumes anything else, so unrelated
//! panics are never masked.
//!
//! Requires unwinding panics — a `panic = "abort"` build turns every raise
//! into a process abort.

use std::panic::{self, AssertUnwindSafe};

use crate::core::{ErrorCode, VelaError};
use crate::guard::{BoundaryRegistry, UnhandledRaise};

/// Payload carried by a raise. Crate-private on purpose: only this module's
/// boundaries can absorb it.
struct Raised(VelaError);

/// Raise `err` toward the nearest recovery boundary on this thread.
///
/// With no boundary registered, the registry's [`UnhandledRaise`] policy
/// applies — report-and-abort by default, or park the thread. A raise never
/// continues silently.
pub fn raise(err: VelaError) -> ! {
    let registry = BoundaryRegistry::global();
    if !registry.is_registered() {
        match registry.policy() {
            UnhandledRaise::Terminate => {
                tracing::error!(code = err.code().raw(), "raise without recovery boundary");
                eprintln!("raise without recovery boundary: {err}");
                std::process::abort();
            }
            UnhandledRaise::Block => {
                tracing::error!(code = err.code().raw(), "raise without recovery boundary; parking");
                eprintln!("raise without recovery boundary (parked): {err}");
                loop {
                    std::thread::park();
                }
            }
        }
    }
    panic::panic_any(Raised(err));
}

/// Raise a generic error at this call site unless `condition` holds.
pub fn must(condition: bool) {
    if !condition {
        raise(VelaError::with_skip(ErrorCode::NONE, "not ok", 1));
    }
}

/// Unwrap `result`, raising `fallback` re-stamped at this call site when an
/// error is present.
pub fn must_ok<T, E>(result: Result<T, E>, fallback: &VelaError) -> T {
    match result {
        Ok(value) => value,
        Err(_) => raise(fallback.restamped(1)),
    }
}

/// Raise `fallback` re-stamped at this call site when an error value is
/// present.
pub fn must_none<E: std::error::Error>(value: Option<E>, fallback: &VelaError) {
    if value.is_some() {
        raise(fallback.restamped(1));
    }
}

/// Raise a generic error when a non-error payload is unexpectedly present.
pub fn must_absent<T>(value: Option<T>) {
    if value.is_some() {
        raise(VelaError::with_skip(ErrorCode::NONE, "not ok", 1));
    }
}

/// Run `f` inside a recovery boundary.
///
/// A [`VelaError`] raised anywhere below `f` (on this thread) is returned as
/// `Err`; normal completion returns `Ok`. Any other in-flight panic payload
/// is resumed untouched. Boundaries nest: the innermost one catches, and the
/// per-thread registration stays in place until the outermost exits.
pub fn with_recovery<T>(f: impl FnOnce() -> T) -> Result<T, VelaError> {
    let registry = BoundaryRegistry::global();
    let guard = registry.enter();
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    drop(guard);
    match outcome {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Raised>() {
            Ok(raised) => Err(raised.0),
            Err(foreign) => panic::resume_unwind(foreign),
        },
    }
}

/// Run `f` inside a recovery boundary, routing a caught error to `handler`.
///
/// Returns `Some` with `f`'s value on normal completion, `None` after a
/// recovery.
pub fn recover_into<T>(handler: impl FnOnce(VelaError), f: impl FnOnce() -> T) -> Option<T> {
    match with_recovery(f) {
        Ok(value) => Some(value),
        Err(err) => {
            handler(err);
            None
        }
    }
}

/// Install a panic hook that stays quiet for raised errors.
///
/// Raised errors travel as panics, so the process panic hook fires for each
/// one even though a boundary will absorb it. This wraps the current hook
/// and forwards everything except this crate's raise payload.
pub fn install_panic_filter() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<Raised>().is_none() {
            previous(info);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() {
        // Keep raise noise out of test output; idempotent across tests.
        install_panic_filter();
    }

    #[test]
    fn normal_completion_passes_through() {
        quiet();
        let out = with_recovery(|| 2 + 2);
        assert_eq!(out.unwrap(), 4);
    }

    #[test]
    fn must_failure_is_recovered() {
        quiet();
        let out = with_recovery(|| {
            must(false);
            "unreachable"
        });
        let err = out.unwrap_err();
        assert!(err.code().is_none());
        assert_eq!(err.message(), "not ok");
    }

    #[test]
    fn must_ok_unwraps_success() {
        quiet();
        let fallback = VelaError::new(ErrorCode::new(7), "fallback");
        let out = with_recovery(|| must_ok(Ok::<_, std::io::Error>(5), &fallback));
        assert_eq!(out.unwrap(), 5);
    }

    #[test]
    fn must_ok_raises_restamped_fallback() {
        quiet();
        let fallback = VelaError::new(ErrorCode::new(7), "fallback");
        let out = with_recovery(|| {
            must_ok::<i32, _>(Err(std::io::Error::other("io down")), &fallback)
        });
        let err = out.unwrap_err();
        assert_eq!(err.code().raw(), 7);
        assert_eq!(err.message(), "fallback");
    }

    #[test]
    fn must_none_accepts_absent() {
        quiet();
        let fallback = VelaError::new(ErrorCode::new(8), "fallback");
        let out = with_recovery(|| must_none(None::<std::io::Error>, &fallback));
        assert!(out.is_ok());
    }

    #[test]
    fn must_absent_raises_generic_on_presence() {
        quiet();
        let out = with_recovery(|| must_absent(Some("unexpected payload")));
        assert!(out.unwrap_err().code().is_none());
    }

    #[test]
    fn foreign_panics_are_resumed() {
        quiet();
        let outer = with_recovery(|| {
            let caught = std::panic::catch_unwind(|| {
                let _ = with_recovery::<()>(|| panic!("not a raise"));
            });
            assert!(caught.is_err(), "boundary must not absorb foreign panics");
        });
        assert!(outer.is_ok());
    }

    #[test]
    fn nested_boundaries_catch_at_the_innermost() {
        quiet();
        let registry = BoundaryRegistry::global();
        let outer = with_recovery(|| {
            let inner = with_recovery(|| {
                assert!(registry.is_registered());
                must(false);
            });
            assert!(inner.is_err(), "inner boundary catches");
            assert!(
                registry.is_registered(),
                "outer registration survives inner exit"
            );
            "outer completed"
        });
        assert_eq!(outer.unwrap(), "outer completed");
    }

    #[test]
    fn recover_into_routes_to_handler() {
        quiet();
        let mut seen = None;
        let out = recover_into(
            |err| seen = Some(err),
            || {
                must(false);
            },
        );
        assert!(out.is_none());
        assert_eq!(seen.unwrap().message(), "not ok");
    }
}
