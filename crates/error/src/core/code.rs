//! Business error codes.

use std::fmt;

use serde::Serialize;

/// A business error code: an integer newtype with a `NONE` sentinel that is
/// excluded from identity.
///
/// Two errors are "the same kind" only when both carry a real (non-sentinel)
/// code and those codes are equal; see [`matches`](ErrorCode::matches). The
/// sentinel [`NONE`](ErrorCode::NONE) stands for a generic, uncoded error and
/// never matches anything — not even another sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// The sentinel code for generic, uncoded errors.
    pub const NONE: Self = Self(-1);

    /// An error code wrapping `raw`.
    #[inline]
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The underlying integer.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether this is the generic [`NONE`](ErrorCode::NONE) sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Same kind: both codes are real (non-sentinel) and equal.
    ///
    /// Two sentinel codes never match.
    #[inline]
    #[must_use]
    pub const fn matches(self, other: Self) -> bool {
        !self.is_none() && self.0 == other.0
    }
}

impl fmt::Display for ErrorCode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
