//! The core error value: code, message, shared resolved stack.

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::core::code::ErrorCode;
use crate::render::{decimal_len, json_escaped_len, write_json_escaped};
use crate::trace::{ResolvedStack, Tracer, capture};

/// An immutable error value carrying a business code, a message, and the
/// call stack present at the moment of creation.
///
/// The stack is a shared reference into the process-wide fingerprint cache:
/// constructing a `VelaError` at an already-seen call site costs one raw
/// stack walk and one lock-free cache load — no symbolication, no formatting
/// work. Rendering reuses lengths precomputed at cache-insert time, so a
/// coded, full-stack error costs close to a plain message-only error.
///
/// Values clone cheaply and cross threads freely; everything behind the
/// `Arc` is immutable.
#[derive(Debug, Clone)]
pub struct VelaError {
    code: ErrorCode,
    message: Cow<'static, str>,
    stack: Arc<ResolvedStack>,
}

/// Extra frames `with_skip` hides so a captured stack starts at the caller
/// of the public constructor rather than inside this module.
const CONSTRUCTOR_SKIP: usize = 1;

impl VelaError {
    /// Error with a business code, capturing the stack at the caller.
    #[inline]
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_skip(code, message, CONSTRUCTOR_SKIP)
    }

    /// Generic error: sentinel code, arbitrary message.
    #[inline]
    pub fn generic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_skip(ErrorCode::NONE, message, CONSTRUCTOR_SKIP)
    }

    /// Error whose stack starts `skip` frames above the caller.
    ///
    /// `skip == 0` records the immediate caller; helpers that construct
    /// errors on behalf of their own callers pass their wrapper depth.
    pub fn with_skip(code: ErrorCode, message: impl Into<Cow<'static, str>>, skip: usize) -> Self {
        let fingerprint = capture(skip + 1, 0);
        let stack = Tracer::global().resolve(&fingerprint);
        Self {
            code,
            message: message.into(),
            stack,
        }
    }

    /// Error over an already-resolved stack.
    ///
    /// For callers that hold a [`ResolvedStack`] of their own — adapters and
    /// tests that need exact, environment-independent frames.
    pub fn from_resolved(
        code: ErrorCode,
        message: impl Into<Cow<'static, str>>,
        stack: Arc<ResolvedStack>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            stack,
        }
    }

    /// The business code.
    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The resolved stack captured at construction.
    #[inline]
    pub fn stack(&self) -> &ResolvedStack {
        &self.stack
    }

    /// Same kind of error: both codes present and equal.
    ///
    /// Two generic (sentinel-code) errors are never the same kind by this
    /// check, whatever their messages.
    #[inline]
    pub fn is(&self, other: &VelaError) -> bool {
        self.code.matches(other.code)
    }

    /// New error with identical code and message but a freshly captured
    /// stack, for re-stamping an error as it crosses an API boundary. The
    /// source is never mutated.
    pub fn with_fresh_stack(&self) -> Self {
        self.restamped(CONSTRUCTOR_SKIP)
    }

    pub(crate) fn restamped(&self, skip: usize) -> Self {
        Self::with_skip(self.code, self.message.clone(), skip + 1)
    }

    /// Exact byte length of [`render_text`](Self::render_text).
    pub(crate) fn text_len(&self) -> usize {
        decimal_len(i64::from(self.code.raw()))
            + 2
            + self.message.len()
            + 1
            + self.stack.text_section_len()
    }

    pub(crate) fn write_text<W: Write>(&self, w: &mut W) -> fmt::Result {
        write!(w, "{}", self.code.raw())?;
        w.write_str(", ")?;
        w.write_str(&self.message)?;
        w.write_char(';')?;
        self.stack.write_text_section(w)
    }

    /// Render to text: `"<code>, <message>;"` followed, when the stack is
    /// non-empty, by one indented line per frame:
    ///
    /// ```text
    /// 42, boom;
    ///     (file.go:10) f;
    /// ```
    ///
    /// The buffer is sized exactly from precomputed lengths before writing;
    /// no growth happens during the write.
    pub fn render_text(&self) -> String {
        let total = self.text_len();
        let mut out = String::with_capacity(total);
        // Writing into a String is infallible.
        let _ = self.write_text(&mut out);
        debug_assert_eq!(out.len(), total, "text pre-size drifted from writer");
        out
    }

    /// Exact byte length of [`to_json`](Self::to_json), given the escaped
    /// message length (the only dynamic part).
    pub(crate) fn json_len_with(&self, escaped_message: usize) -> usize {
        let mut total = 8 // {"code":
            + decimal_len(i64::from(self.code.raw()))
            + 8 // ,"msg":"
            + escaped_message
            + 1 // closing quote
            + 1; // }
        if !self.stack.is_empty() {
            total += 9 + self.stack.json_array_len(); // ,"stack": + array
        }
        total
    }

    pub(crate) fn write_json<W: Write>(&self, w: &mut W, escaped_message: usize) -> fmt::Result {
        w.write_str("{\"code\":")?;
        write!(w, "{}", self.code.raw())?;
        w.write_str(",\"msg\":\"")?;
        if escaped_message == self.message.len() {
            w.write_str(&self.message)?;
        } else {
            write_json_escaped(w, &self.message)?;
        }
        w.write_char('"')?;
        if !self.stack.is_empty() {
            w.write_str(",\"stack\":")?;
            self.stack.write_json_array(w)?;
        }
        w.write_char('}')
    }

    /// Render to the structured form:
    /// `{"code":<int>,"msg":"<escaped>","stack":["(file:line) fn", …]}`,
    /// with `stack` omitted when empty.
    ///
    /// Stack lengths and escape flags were precomputed at cache-insert time;
    /// the dynamic message gets one incremental escape scan. The buffer is
    /// sized exactly before writing.
    pub fn to_json(&self) -> String {
        let escaped_message = json_escaped_len(&self.message);
        let total = self.json_len_with(escaped_message);
        let mut out = String::with_capacity(total);
        let _ = self.write_json(&mut out, escaped_message);
        debug_assert_eq!(out.len(), total, "json pre-size drifted from writer");
        out
    }
}

impl fmt::Display for VelaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f)
    }
}

impl std::error::Error for VelaError {}

/// Mirrors [`VelaError::to_json`]: a map of `code`, `msg`, and — when the
/// stack is non-empty — `stack` as an array of rendered frame strings.
impl Serialize for VelaError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.stack.is_empty() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(fields))?;
        map.serialize_entry("code", &self.code.raw())?;
        map.serialize_entry("msg", self.message.as_ref())?;
        if !self.stack.is_empty() {
            map.serialize_entry("stack", &FrameSeq(&self.stack))?;
        }
        map.end()
    }
}

struct FrameSeq<'a>(&'a ResolvedStack);

impl Serialize for FrameSeq<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for frame in self.0.frames() {
            seq.serialize_element(frame.rendered())?;
        }
        seq.end()
    }
}
