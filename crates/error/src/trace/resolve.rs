//! Symbolication of fingerprints into pre-formatted stacks.
//!
//! Resolution is the expensive step the cache amortizes: each raw address is
//! looked up against debug info, file paths are normalized so the same call
//! site serializes identically across build machines, and every length and
//! escape decision the serializers need later is computed here, once, at
//! insertion time.

use std::fmt::{self, Write};
use std::sync::{Arc, OnceLock};

use crate::render::{json_escaped_len, write_json_escaped};
use crate::trace::fingerprint::StackFingerprint;

/// One symbolicated stack entry.
///
/// Carries the normalized project-relative file path, the line, the function
/// name, and the derived `"(file:line) function"` string the renderers emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFrame {
    file: String,
    line: u32,
    function: String,
    rendered: String,
}

impl ResolvedFrame {
    /// Build a frame and its rendered form.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        let file = file.into();
        let function = function.into();
        let rendered = format!("({file}:{line}) {function}");
        Self {
            file,
            line,
            function,
            rendered,
        }
    }

    /// Normalized file path.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source line, `0` when debug info had none.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Demangled function name.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The `"(file:line) function"` form used by both renderers.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// The `"file:line"` form logging adapters attach as a caller field.
    pub fn caller(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// An ordered, immutable stack of resolved frames with render metadata.
///
/// Shared by `Arc` across every error that hits the same fingerprint. The
/// text length, JSON length, and per-frame escape bitmap are fixed at
/// construction so rendering is O(output size) with no rescanning.
#[derive(Debug)]
pub struct ResolvedStack {
    frames: Vec<ResolvedFrame>,
    text_len: usize,
    json_len: usize,
    escape_mask: u32,
}

impl ResolvedStack {
    /// Build a stack from frames, precomputing all render metadata.
    ///
    /// Truncates to [`MAX_DEPTH`](crate::trace::MAX_DEPTH) frames; the escape
    /// bitmap has exactly that many bits.
    pub fn from_frames(mut frames: Vec<ResolvedFrame>) -> Self {
        frames.truncate(crate::trace::MAX_DEPTH);
        let mut text_len = 0;
        let mut json_len = 0;
        let mut escape_mask = 0_u32;

        if !frames.is_empty() {
            // Text section: '\n' + "    f0" + (", \n    fi")* + ';'
            text_len = 2;
            // JSON array: '[' + ("fi" quoted, comma-separated)* + ']'
            json_len = 2;
            for (i, frame) in frames.iter().enumerate() {
                let rendered = frame.rendered();
                text_len += rendered.len() + if i == 0 { 4 } else { 7 };

                let escaped = json_escaped_len(rendered);
                if escaped != rendered.len() {
                    escape_mask |= 1 << i;
                }
                json_len += escaped + 2 + usize::from(i > 0);
            }
        }

        Self {
            frames,
            text_len,
            json_len,
            escape_mask,
        }
    }

    /// The process-wide empty stack.
    pub fn shared_empty() -> Arc<Self> {
        static EMPTY: OnceLock<Arc<ResolvedStack>> = OnceLock::new();
        Arc::clone(EMPTY.get_or_init(|| Arc::new(Self::from_frames(Vec::new()))))
    }

    /// Resolved frames, innermost first.
    pub fn frames(&self) -> &[ResolvedFrame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame resolved.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Exact byte length [`write_text_section`](Self::write_text_section)
    /// produces, `0` for an empty stack.
    pub(crate) fn text_section_len(&self) -> usize {
        self.text_len
    }

    /// Exact byte length [`write_json_array`](Self::write_json_array)
    /// produces, `0` for an empty stack.
    pub(crate) fn json_array_len(&self) -> usize {
        self.json_len
    }

    /// Write the text stack section: leading newline, indented frames
    /// separated by `", \n"`, closing `';'`. Writes nothing when empty.
    pub(crate) fn write_text_section<W: Write>(&self, w: &mut W) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        w.write_char('\n')?;
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                w.write_str(", \n")?;
            }
            w.write_str("    ")?;
            w.write_str(frame.rendered())?;
        }
        w.write_char(';')
    }

    /// Write the JSON frame array. Frames whose escape bit is clear are
    /// copied verbatim; the rest go through the escaping writer.
    pub(crate) fn write_json_array<W: Write>(&self, w: &mut W) -> fmt::Result {
        w.write_char('[')?;
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                w.write_char(',')?;
            }
            w.write_char('"')?;
            if self.escape_mask & (1 << i) == 0 {
                w.write_str(frame.rendered())?;
            } else {
                write_json_escaped(w, frame.rendered())?;
            }
            w.write_char('"')?;
        }
        w.write_char(']')
    }
}

/// Policy knobs for symbolication.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Stop collecting (keeping what was already collected) at the first
    /// frame whose function name starts with one of these, provided at least
    /// one real frame was collected. Hides test-harness and runtime
    /// internals below the interesting frames.
    pub ignore_prefixes: Vec<String>,
    /// Frames recognized as the program entry point; the entry frame is
    /// included and the walk stops after it.
    pub entry_points: Vec<String>,
    /// Path segments recognized as source roots. Paths are trimmed to start
    /// at the first matching segment.
    pub source_roots: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            ignore_prefixes: vec![
                "std::rt::".into(),
                "std::sys".into(),
                "test::".into(),
                "core::ops::function::".into(),
            ],
            entry_points: vec!["main".into()],
            source_roots: vec![
                "crates".into(),
                "src".into(),
                "tests".into(),
                "benches".into(),
            ],
        }
    }
}

impl ResolveOptions {
    fn is_ignored(&self, function: &str) -> bool {
        self.ignore_prefixes.iter().any(|p| function.starts_with(p))
    }

    fn is_entry_point(&self, function: &str) -> bool {
        self.entry_points
            .iter()
            .any(|e| function == e || function.ends_with(&format!("::{e}")))
    }
}

/// Symbolicate a fingerprint into a resolved stack.
///
/// Never fails: addresses without debug info become `(??:0) <unknown>`
/// frames, and truncation policies (ignore prefixes, entry point) only ever
/// shorten the result.
pub(crate) fn resolve_fingerprint(
    fingerprint: &StackFingerprint,
    options: &ResolveOptions,
) -> ResolvedStack {
    let mut frames = Vec::with_capacity(fingerprint.len());

    for &pc in fingerprint.addresses() {
        let frame = symbolicate(pc, options);

        if !frames.is_empty() && options.is_ignored(frame.function()) {
            break;
        }
        let is_entry = options.is_entry_point(frame.function());
        frames.push(frame);
        if is_entry {
            break;
        }
    }

    ResolvedStack::from_frames(frames)
}

fn symbolicate(pc: usize, options: &ResolveOptions) -> ResolvedFrame {
    let mut resolved: Option<ResolvedFrame> = None;
    backtrace::resolve(pc as *mut std::ffi::c_void, |symbol| {
        if resolved.is_some() {
            // Inlined callees report multiple symbols per address; the first
            // (innermost) one is the call site we want.
            return;
        }
        let function = symbol
            .name()
            .map_or_else(|| String::from("<unknown>"), |n| trim_hash(&format!("{n:#}")));
        let file = symbol.filename().map_or_else(
            || String::from("??"),
            |p| normalize_path(&p.to_string_lossy(), &options.source_roots),
        );
        let line = symbol.lineno().unwrap_or(0);
        resolved = Some(ResolvedFrame::new(file, line, function));
    });

    resolved.unwrap_or_else(|| ResolvedFrame::new("??", 0, "<unknown>"))
}

/// Strip a trailing `::h<16 hex>` disambiguator from a demangled name.
fn trim_hash(name: &str) -> String {
    if let Some(pos) = name.rfind("::h") {
        let tail = &name[pos + 3..];
        if tail.len() == 16 && tail.bytes().all(|b| b.is_ascii_hexdigit()) {
            return name[..pos].to_string();
        }
    }
    name.to_string()
}

/// Normalize a source path so the same call site renders identically
/// regardless of build machine or dependency cache layout.
///
/// - `name@version` segments lose their version marker;
/// - cargo registry prefixes (`…/registry/src/<index>/`) are dropped, leaving
///   the versioned crate directory as the path root;
/// - rustc toolchain prefixes (`/rustc/<hash>/`) are dropped;
/// - finally the path is trimmed to start at the first recognized source
///   root segment, when one is present.
fn normalize_path(raw: &str, source_roots: &[String]) -> String {
    let raw = raw.replace('\\', "/");
    let mut segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(pos) = segments
        .iter()
        .position(|s| *s == "registry")
        .filter(|&pos| segments.get(pos + 1) == Some(&"src") && pos + 3 < segments.len())
    {
        segments.drain(..pos + 3);
    }

    if segments.first() == Some(&"rustc")
        && segments.len() > 2
        && segments[1].len() == 40
        && segments[1].bytes().all(|b| b.is_ascii_hexdigit())
    {
        segments.drain(..2);
    }

    let segments: Vec<&str> = segments
        .into_iter()
        .map(|s| s.split('@').next().unwrap_or(s))
        .collect();

    if let Some(pos) = segments
        .iter()
        .position(|s| source_roots.iter().any(|r| r == s))
    {
        return segments[pos..].join("/");
    }

    if raw.starts_with('/') {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}
