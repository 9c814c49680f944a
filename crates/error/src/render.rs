//! Shared rendering primitives for the pre-sized text and JSON writers.
//!
//! Everything here is pure and allocation-free: length computations mirror
//! their writer counterparts byte for byte, so callers can size an output
//! buffer once and then write into it with zero growth. Any drift between a
//! `*_len` function and its writer is a bug; the render paths carry
//! `debug_assert_eq!` checks to catch it.

use std::fmt::{self, Write};

/// Number of bytes `v` occupies in decimal, including a leading `-`.
pub(crate) fn decimal_len(v: i64) -> usize {
    let mut n = v.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits + usize::from(v < 0)
}

/// Bytes the JSON string escape of `c` occupies, or `None` if `c` passes
/// through verbatim.
///
/// Escaped set: control characters, `"`, `\`, and the Unicode line/paragraph
/// separators U+2028/U+2029 (raw, they break eval-style JSON consumers).
fn escape_len(c: char) -> Option<usize> {
    match c {
        '"' | '\\' | '\n' | '\r' | '\t' | '\u{8}' | '\u{c}' => Some(2),
        c if (c as u32) < 0x20 => Some(6),
        '\u{2028}' | '\u{2029}' => Some(6),
        _ => None,
    }
}

/// Byte length of `s` after JSON string escaping (quotes not included).
///
/// Every escape lengthens its character, so `json_escaped_len(s) == s.len()`
/// exactly when `s` needs no escaping at all.
pub(crate) fn json_escaped_len(s: &str) -> usize {
    let mut len = 0;
    for c in s.chars() {
        len += escape_len(c).unwrap_or_else(|| c.len_utf8());
    }
    len
}

/// Write `s` into `w` with JSON string escaping applied.
///
/// Clean spans are copied in bulk; only characters from the escape set go
/// through the slow path.
pub(crate) fn write_json_escaped<W: Write>(w: &mut W, s: &str) -> fmt::Result {
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if escape_len(c).is_none() {
            continue;
        }
        w.write_str(&s[start..i])?;
        match c {
            '"' => w.write_str("\\\"")?,
            '\\' => w.write_str("\\\\")?,
            '\n' => w.write_str("\\n")?,
            '\r' => w.write_str("\\r")?,
            '\t' => w.write_str("\\t")?,
            '\u{8}' => w.write_str("\\b")?,
            '\u{c}' => w.write_str("\\f")?,
            _ => write!(w, "\\u{:04x}", c as u32)?,
        }
        start = i + c.len_utf8();
    }
    w.write_str(&s[start..])
}

/// `fmt::Write` sink that counts the JSON-escaped length of what is written.
///
/// Used by the chain renderer to pre-size buffers for `Display` output of
/// foreign errors without an intermediate allocation.
#[derive(Debug, Default)]
pub(crate) struct EscapedLenCounter {
    bytes: usize,
}

impl EscapedLenCounter {
    pub(crate) fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Write for EscapedLenCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes += json_escaped_len(s);
        Ok(())
    }
}

/// Adapter that JSON-escapes everything written through it.
pub(crate) struct EscapingWriter<'a, W: Write> {
    inner: &'a mut W,
}

impl<'a, W: Write> EscapingWriter<'a, W> {
    pub(crate) fn new(inner: &'a mut W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for EscapingWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_json_escaped(self.inner, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        write_json_escaped(&mut out, s).unwrap();
        out
    }

    #[test]
    fn decimal_len_covers_sign_and_digits() {
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(7), 1);
        assert_eq!(decimal_len(42), 2);
        assert_eq!(decimal_len(-1), 2);
        assert_eq!(decimal_len(-1000), 5);
        assert_eq!(decimal_len(i64::from(i32::MIN)), 11);
    }

    #[test]
    fn clean_strings_pass_through() {
        assert_eq!(escaped("plain ascii"), "plain ascii");
        assert_eq!(json_escaped_len("plain ascii"), 11);
        assert_eq!(escaped("ünïcode"), "ünïcode");
    }

    #[test]
    fn quotes_and_backslashes_escape() {
        assert_eq!(escaped(r#"say "hi"\"#), r#"say \"hi\"\\"#);
    }

    #[test]
    fn control_characters_escape() {
        assert_eq!(escaped("a\nb\tc"), "a\\nb\\tc");
        assert_eq!(escaped("\u{1}"), "\\u0001");
        assert_eq!(escaped("\u{8}\u{c}"), "\\b\\f");
    }

    #[test]
    fn line_separators_escape() {
        assert_eq!(escaped("a\u{2028}b\u{2029}"), "a\\u2028b\\u2029");
    }

    #[test]
    fn escaped_len_matches_writer() {
        for s in ["", "plain", "q\"q", "\\", "\n\r\t", "\u{2028}", "mixed \"x\"\n\u{2029}é"] {
            assert_eq!(json_escaped_len(s), escaped(s).len(), "input: {s:?}");
        }
    }

    #[test]
    fn parses_as_json_string() {
        let s = "tricky \"msg\"\nwith \\ and \u{2028}";
        let quoted = format!("\"{}\"", escaped(s));
        let back: String = serde_json::from_str(&quoted).unwrap();
        assert_eq!(back, s);
    }
}
