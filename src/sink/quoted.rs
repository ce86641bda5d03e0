//! Quoting sink adapter.
//!
//! Every line written through a [`QuotingSink`] reaches the raw writer as a
//! single record:
//!
//! ```text
//! ~"Breakpoint 1 at 0x4004f4: file main.c, line 3.\n"
//! ```
//!
//! The leading marker says which stream the record belongs to, so a
//! consumer reading one byte stream can split console text (`~`) from
//! log/error text (`&`). The quoted body uses C escapes and can be turned
//! back into the original text with [`unescape`].

use std::fmt::Write as _;
use std::io::{self, Write};

use thiserror::Error;

use super::Sink;

/// Marker for console (echoed human) text.
pub const CONSOLE_MARKER: &str = "~";
/// Marker for log and error text.
pub const LOG_MARKER: &str = "&";

/// Sink that escapes and frames every line for a machine consumer.
///
/// Text is held until a newline completes the line or the sink is flushed.
/// Call [`Sink::flush`] before dropping it, or a partial last line is lost.
#[derive(Debug)]
pub struct QuotingSink<W: Write> {
    raw: W,
    marker: String,
    line: String,
}

impl<W: Write> QuotingSink<W> {
    pub fn new(raw: W, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        debug_assert!(
            !marker.contains('"') && !marker.contains('\n'),
            "marker must not contain quotes or newlines"
        );
        Self {
            raw,
            marker,
            line: String::new(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn get_ref(&self) -> &W {
        &self.raw
    }

    /// Text written but not yet emitted as a record.
    pub fn pending(&self) -> &str {
        &self.line
    }

    fn emit_record(&mut self) -> io::Result<()> {
        if self.line.is_empty() {
            return Ok(());
        }
        let mut record = String::with_capacity(self.marker.len() + self.line.len() + 4);
        record.push_str(&self.marker);
        record.push('"');
        escape_into(&self.line, &mut record);
        record.push_str("\"\n");
        self.line.clear();
        self.raw.write_all(record.as_bytes())
    }
}

impl<W: Write> Sink for QuotingSink<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        for piece in text.split_inclusive('\n') {
            self.line.push_str(piece);
            if piece.ends_with('\n') {
                self.emit_record()?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_record()?;
        self.raw.flush()
    }
}

/// Escape `text` for the body of a quoted record.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\x1b' => out.push_str("\\e"),
            c if c.is_ascii_control() => {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// Errors from decoding a quoted record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnquoteError {
    #[error("record is not quoted")]
    NotQuoted,

    #[error("escape sequence cut short at end of record")]
    DanglingEscape,

    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),

    #[error("unescaped quote inside record")]
    StrayQuote,

    #[error("record body is not valid UTF-8")]
    InvalidUtf8,
}

/// Invert [`escape`].
pub fn unescape(body: &str) -> Result<String, UnquoteError> {
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err(UnquoteError::StrayQuote),
            '\\' => {
                let esc = chars.next().ok_or(UnquoteError::DanglingEscape)?;
                let byte = match esc {
                    '\\' => b'\\',
                    '"' => b'"',
                    'n' => b'\n',
                    't' => b'\t',
                    'r' => b'\r',
                    'a' => 0x07,
                    'b' => 0x08,
                    'f' => 0x0c,
                    'e' => 0x1b,
                    '0'..='7' => {
                        let mut value = esc as u32 - '0' as u32;
                        for _ in 0..2 {
                            let digit = chars
                                .next()
                                .and_then(|d| d.to_digit(8))
                                .ok_or(UnquoteError::DanglingEscape)?;
                            value = value * 8 + digit;
                        }
                        u8::try_from(value).map_err(|_| UnquoteError::UnknownEscape(esc))?
                    }
                    other => return Err(UnquoteError::UnknownEscape(other)),
                };
                bytes.push(byte);
            }
            c => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(bytes).map_err(|_| UnquoteError::InvalidUtf8)
}

/// Split one record into its marker and decoded text.
///
/// A trailing newline after the closing quote is accepted.
pub fn parse_record(record: &str) -> Result<(&str, String), UnquoteError> {
    let record = record.strip_suffix('\n').unwrap_or(record);
    let open = record.find('"').ok_or(UnquoteError::NotQuoted)?;
    let (marker, quoted) = record.split_at(open);
    let body = quoted[1..]
        .strip_suffix('"')
        .ok_or(UnquoteError::NotQuoted)?;
    Ok((marker, unescape(body)?))
}
