//! Breadcrumb chains: cheap annotations attached as an error crosses
//! logical boundaries.
//!
//! A [`Breadcrumb`] is a single-frame capture — label, timestamp, one cached
//! caller frame — far cheaper than re-stamping a full error. A [`WrapChain`]
//! is a root [`VelaError`] plus its breadcrumbs in attach order; rendering is
//! always root cause first, then breadcrumbs in the order they were attached.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::core::code::ErrorCode;
use crate::core::error::VelaError;
use crate::render::{EscapedLenCounter, EscapingWriter, json_escaped_len};
use crate::trace::{ResolvedFrame, Tracer, capture};

/// One annotated boundary crossing.
#[derive(Debug, Clone)]
pub struct Breadcrumb {
    label: Cow<'static, str>,
    at: DateTime<Utc>,
    caller: Option<ResolvedFrame>,
}

impl Breadcrumb {
    fn record(label: Cow<'static, str>, skip: usize) -> Self {
        let fingerprint = capture(skip + 1, 1);
        let caller = Tracer::global()
            .resolve(&fingerprint)
            .frames()
            .first()
            .cloned();
        Self {
            label,
            at: Utc::now(),
            caller,
        }
    }

    /// The label given at the wrap site.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the breadcrumb was attached.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.at
    }

    /// The wrap call site, when the single-frame capture resolved.
    pub fn caller(&self) -> Option<&ResolvedFrame> {
        self.caller.as_ref()
    }

    // Secondary JSON key and value: `caller` when the frame resolved,
    // `time` otherwise, so every crumb serializes exactly one of the two.
    fn tag(&self) -> CrumbTag {
        match &self.caller {
            Some(frame) => CrumbTag::Caller(frame.caller()),
            None => CrumbTag::Time(self.at.to_rfc3339()),
        }
    }
}

enum CrumbTag {
    Caller(String),
    Time(String),
}

/// A root error with breadcrumbs attached, oldest (root cause) first.
#[derive(Debug, Clone)]
pub struct WrapChain {
    root: VelaError,
    crumbs: Vec<Breadcrumb>,
}

/// Result of [`WrapChain::unwrap_one`].
#[derive(Debug, Clone)]
pub enum Unwrapped {
    /// Breadcrumbs remain; the chain continues.
    Chain(WrapChain),
    /// The last breadcrumb was removed; only the root is left.
    Root(VelaError),
}

/// Attach a breadcrumb to `source`, returning the (same logical) chain.
///
/// `source` may be an existing chain or a bare [`VelaError`]; a foreign
/// error goes through [`WrapChain::from_foreign`] first. The breadcrumb
/// records this call site, depth 1, through the fingerprint cache.
pub fn wrap(source: impl Into<WrapChain>, label: impl Into<Cow<'static, str>>) -> WrapChain {
    let mut chain = source.into();
    chain.push_crumb(label.into(), 1);
    chain
}

/// Adapt a foreign error and attach a breadcrumb in one step.
pub fn wrap_foreign<E: fmt::Display + ?Sized>(
    err: &E,
    label: impl Into<Cow<'static, str>>,
) -> WrapChain {
    let mut chain = WrapChain::from_foreign_with_skip(err, 1);
    chain.push_crumb(label.into(), 1);
    chain
}

impl From<VelaError> for WrapChain {
    fn from(root: VelaError) -> Self {
        Self {
            root,
            crumbs: Vec::new(),
        }
    }
}

impl WrapChain {
    /// Adapt an error from outside this system into a chain root: sentinel
    /// code, the error's display text as message, full-stack capture here.
    pub fn from_foreign<E: fmt::Display + ?Sized>(err: &E) -> Self {
        Self::from_foreign_with_skip(err, 1)
    }

    fn from_foreign_with_skip<E: fmt::Display + ?Sized>(err: &E, skip: usize) -> Self {
        Self {
            root: VelaError::with_skip(ErrorCode::NONE, err.to_string(), skip + 1),
            crumbs: Vec::new(),
        }
    }

    /// The root cause.
    pub fn root(&self) -> &VelaError {
        &self.root
    }

    /// Breadcrumbs in attach order.
    pub fn crumbs(&self) -> &[Breadcrumb] {
        &self.crumbs
    }

    /// Attach another breadcrumb recording this call site.
    pub fn wrap(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.push_crumb(label.into(), 1);
        self
    }

    fn push_crumb(&mut self, label: Cow<'static, str>, skip: usize) {
        self.crumbs.push(Breadcrumb::record(label, skip + 1));
    }

    /// Remove and discard the most recently attached breadcrumb.
    ///
    /// Returns the chain while breadcrumbs remain, the bare root once none
    /// do. Deliberately shallow — this peels annotations, it does not expose
    /// the inner cause of the root.
    pub fn unwrap_one(mut self) -> Unwrapped {
        self.crumbs.pop();
        if self.crumbs.is_empty() {
            Unwrapped::Root(self.root)
        } else {
            Unwrapped::Chain(self)
        }
    }

    /// Render to text: the root first, then one line per breadcrumb in
    /// attach order:
    ///
    /// ```text
    /// 42, boom;
    ///     (src/io.rs:10) read;
    ///     -> flush (src/io.rs:88)
    /// ```
    pub fn render_text(&self) -> String {
        let parts: Vec<CrumbTag> = self.crumbs.iter().map(Breadcrumb::tag).collect();
        let mut total = self.root.text_len();
        for (crumb, tag) in self.crumbs.iter().zip(&parts) {
            total += 8 + crumb.label.len() + 2 + tag.value_len() + 1;
        }

        let mut out = String::with_capacity(total);
        let _ = self.root.write_text(&mut out);
        for (crumb, tag) in self.crumbs.iter().zip(&parts) {
            out.push_str("\n    -> ");
            out.push_str(&crumb.label);
            out.push_str(" (");
            out.push_str(tag.value());
            out.push(')');
        }
        debug_assert_eq!(out.len(), total, "chain text pre-size drifted");
        out
    }

    /// Render to the structured chain form:
    /// `{"cause":<root object>,"wrapper":[{"trace":"…","caller":"…"}, …]}`,
    /// with `wrapper` omitted when no breadcrumbs are attached.
    pub fn to_json(&self) -> String {
        let escaped_message = json_escaped_len(self.root.message());
        let parts: Vec<CrumbTag> = self.crumbs.iter().map(Breadcrumb::tag).collect();

        let mut total = 9 + self.root.json_len_with(escaped_message) + 1;
        if !self.crumbs.is_empty() {
            total += 12 + 1 + self.crumbs.len() - 1; // ,"wrapper":[ + ] + commas
            for (crumb, tag) in self.crumbs.iter().zip(&parts) {
                total += crumb_json_len(crumb, tag);
            }
        }

        let mut out = String::with_capacity(total);
        out.push_str("{\"cause\":");
        let _ = self.root.write_json(&mut out, escaped_message);
        if !self.crumbs.is_empty() {
            out.push_str(",\"wrapper\":[");
            for (i, (crumb, tag)) in self.crumbs.iter().zip(&parts).enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write_crumb_json(&mut out, crumb, tag);
            }
            out.push(']');
        }
        out.push('}');
        debug_assert_eq!(out.len(), total, "chain json pre-size drifted");
        out
    }
}

impl CrumbTag {
    fn value(&self) -> &str {
        match self {
            CrumbTag::Caller(s) | CrumbTag::Time(s) => s,
        }
    }

    fn value_len(&self) -> usize {
        self.value().len()
    }
}

fn crumb_json_len(crumb: &Breadcrumb, tag: &CrumbTag) -> usize {
    let label = json_escaped_len(&crumb.label);
    match tag {
        // {"trace":"…","caller":"…"}
        CrumbTag::Caller(c) => 10 + label + 12 + json_escaped_len(c) + 2,
        // {"trace":"…","time":"…"} — RFC 3339 needs no escaping
        CrumbTag::Time(t) => 10 + label + 10 + t.len() + 2,
    }
}

fn write_crumb_json<W: Write>(w: &mut W, crumb: &Breadcrumb, tag: &CrumbTag) -> fmt::Result {
    w.write_str("{\"trace\":\"")?;
    crate::render::write_json_escaped(w, &crumb.label)?;
    match tag {
        CrumbTag::Caller(c) => {
            w.write_str("\",\"caller\":\"")?;
            crate::render::write_json_escaped(w, c)?;
        }
        CrumbTag::Time(t) => {
            w.write_str("\",\"time\":\"")?;
            w.write_str(t)?;
        }
    }
    w.write_str("\"}")
}

impl fmt::Display for WrapChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_text(f)?;
        for crumb in &self.crumbs {
            let tag = crumb.tag();
            write!(f, "\n    -> {} ({})", crumb.label, tag.value())?;
        }
        Ok(())
    }
}

impl Error for WrapChain {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.root)
    }
}

/// Mirrors [`WrapChain::to_json`].
impl Serialize for WrapChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.crumbs.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(fields))?;
        map.serialize_entry("cause", &self.root)?;
        if !self.crumbs.is_empty() {
            map.serialize_entry("wrapper", &CrumbSeq(&self.crumbs))?;
        }
        map.end()
    }
}

struct CrumbSeq<'a>(&'a [Breadcrumb]);

impl Serialize for CrumbSeq<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for crumb in self.0 {
            seq.serialize_element(crumb)?;
        }
        seq.end()
    }
}

impl Serialize for Breadcrumb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("trace", self.label.as_ref())?;
        match self.tag() {
            CrumbTag::Caller(c) => map.serialize_entry("caller", &c)?,
            CrumbTag::Time(t) => map.serialize_entry("time", &t)?,
        }
        map.end()
    }
}

/// Render an arbitrary `source()`-linked error chain to the structured form.
///
/// Works for foreign wrapped errors that expose the standard one-level
/// unwrap capability: the innermost cause renders first (depth-first), each
/// outer level appends a `{"trace":"…"}` wrapper entry, and a pre-pass
/// propagates the byte count down the recursion so the whole chain writes
/// into one exactly-sized buffer.
pub fn render_error_chain_json(err: &(dyn Error + 'static)) -> String {
    let (body, wrappers) = levels_len(err);
    let total = 9 + body + usize::from(wrappers > 0) + 1;
    let mut out = String::with_capacity(total);
    out.push_str("{\"cause\":");
    let _ = write_levels(err, &mut out);
    if wrappers > 0 {
        out.push(']');
    }
    out.push('}');
    debug_assert_eq!(out.len(), total, "chain renderer pre-size drifted");
    out
}

fn display_escaped_len(err: &(dyn Error + 'static)) -> usize {
    let mut counter = EscapedLenCounter::default();
    let _ = write!(counter, "{err}");
    counter.bytes()
}

fn levels_len(err: &(dyn Error + 'static)) -> (usize, usize) {
    match err.source() {
        None => (8 + display_escaped_len(err) + 2, 0), // {"msg":"…"}
        Some(inner) => {
            let (inner_len, wrappers) = levels_len(inner);
            let separator = if wrappers == 0 { 12 } else { 1 }; // ,"wrapper":[ or ,
            let own = 10 + display_escaped_len(err) + 2; // {"trace":"…"}
            (inner_len + separator + own, wrappers + 1)
        }
    }
}

fn write_levels<W: Write>(err: &(dyn Error + 'static), w: &mut W) -> Result<usize, fmt::Error> {
    match err.source() {
        None => {
            w.write_str("{\"msg\":\"")?;
            write!(EscapingWriter::new(w), "{err}")?;
            w.write_str("\"}")?;
            Ok(0)
        }
        Some(inner) => {
            let wrappers = write_levels(inner, w)?;
            if wrappers == 0 {
                w.write_str(",\"wrapper\":[")?;
            } else {
                w.write_char(',')?;
            }
            w.write_str("{\"trace\":\"")?;
            write!(EscapingWriter::new(w), "{err}")?;
            w.write_str("\"}")?;
            Ok(wrappers + 1)
        }
    }
}
