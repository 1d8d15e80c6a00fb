use crate::line_break::LineBreakMode;
use encoding_rs::Encoding;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A line/column location in a text buffer, both counted from 0.
///
/// Columns count `char`s, not bytes. A line terminator of any kind
/// (including a CRLF pair) starts exactly one new line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub col: usize
}

impl TextPosition {

    /// Creates a new TextPosition at line 0, col 0.
    pub fn new() -> TextPosition {
        TextPosition {
            line: 0,
            col: 0
        }
    }

    /// Computes the location of the byte `offset` in `text`, recognizing
    /// line terminators according to `mode`.
    ///
    /// Offsets past the end of `text` are clamped to its length. An offset
    /// that sits between the CR and LF of a CRLF pair is reported at the
    /// start of the following line.
    pub fn at(text: &str, offset: usize, mode: LineBreakMode) -> TextPosition {
        let end = offset.min(text.len());
        let mut position = TextPosition::new();
        let mut pos = 0;

        while pos < end {
            if let Some(eol_len) = mode.line_break_len(&text[pos..]) {
                position.line += 1;
                position.col = 0;
                pos += eol_len;
            } else {
                match text[pos..].chars().next() {
                    Some(c) => pos += c.len_utf8(),
                    None => break
                }
                position.col += 1;
            }
        }

        return position;
    }
}

impl Display for TextPosition {

    /// Formats as `line:col`, both 1-based, the way editors show them.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// The two ways a checked scanning operation can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// The text at the current position did not satisfy the operation
    /// (wrong character, literal mismatch, pattern did not match, empty run
    /// where at least one character was required).
    NoMatch,

    /// The operation needed more characters than remain in the buffer, or
    /// an explicit position lies outside the buffer.
    OutOfRange
}

impl Display for ScanErrorKind {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanErrorKind::NoMatch => write!(f, "no match"),
            ScanErrorKind::OutOfRange => write!(f, "unexpected end of input")
        }
    }
}

/// Failure of a checked scanning operation.
///
/// `position` is the byte offset at which the operation was attempted. Since
/// checked operations never consume anything on failure, it is also the
/// position the cursor still has after the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanError {
    kind: ScanErrorKind,
    position: usize
}

impl ScanError {

    pub fn new(kind: ScanErrorKind, position: usize) -> ScanError {
        ScanError { kind, position }
    }

    pub fn no_match(position: usize) -> ScanError {
        ScanError::new(ScanErrorKind::NoMatch, position)
    }

    pub fn out_of_range(position: usize) -> ScanError {
        ScanError::new(ScanErrorKind::OutOfRange, position)
    }

    pub fn get_kind(&self) -> ScanErrorKind {
        self.kind
    }

    pub fn get_position(&self) -> usize {
        self.position
    }

    pub fn is_no_match(&self) -> bool {
        self.kind == ScanErrorKind::NoMatch
    }

    /// True if the failure was caused by running off the end of the buffer.
    /// Callers can use this to report "unexpected end of input" instead of a
    /// generic "alternative failed" diagnostic.
    pub fn is_out_of_range(&self) -> bool {
        self.kind == ScanErrorKind::OutOfRange
    }
}

impl Display for ScanError {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.position)
    }
}

impl Error for ScanError {}

/// Result type of every checked scanning operation.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while loading a text buffer from disk.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be read.
    IO(std::io::Error),

    /// The file contents were not valid in the requested encoding. Holds the
    /// offending bytes, the encoding and where in the decoded text the
    /// problem was found.
    Encoding(Vec<u8>, &'static Encoding, TextPosition),

    /// The encoding label is not known to `encoding_rs`.
    UnknownEncoding(String)
}

impl Display for SourceError {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::IO(err) => write!(f, "IO error: {}", err),
            SourceError::Encoding(bytes, encoding, position) => write!(f, "Could not decode {:?} as valid {} at {}", bytes, encoding.name(), position),
            SourceError::UnknownEncoding(label) => write!(f, "Unknown encoding '{}'", label)
        }
    }
}

impl Error for SourceError {

    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SourceError::IO(err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for SourceError {

    fn from(err: std::io::Error) -> SourceError {
        SourceError::IO(err)
    }
}

#[cfg(test)]
mod tests {

    use super::{ScanError, ScanErrorKind, TextPosition};
    use crate::line_break::LineBreakMode;

    #[test]
    fn text_position_counts_crlf_once() -> () {
        let text = "ab\r\ncd\ne";
        assert_eq!(TextPosition::at(text, 0, LineBreakMode::Ascii), TextPosition { line: 0, col: 0 });
        assert_eq!(TextPosition::at(text, 2, LineBreakMode::Ascii), TextPosition { line: 0, col: 2 });
        assert_eq!(TextPosition::at(text, 4, LineBreakMode::Ascii), TextPosition { line: 1, col: 0 });
        assert_eq!(TextPosition::at(text, 8, LineBreakMode::Ascii), TextPosition { line: 2, col: 1 });
    }

    #[test]
    fn text_position_counts_chars_not_bytes() -> () {
        let text = "äöü!";
        assert_eq!(TextPosition::at(text, 6, LineBreakMode::Ascii), TextPosition { line: 0, col: 3 });
    }

    #[test]
    fn text_position_respects_unicode_line_breaks() -> () {
        let text = "a\u{2028}b";
        assert_eq!(TextPosition::at(text, text.len(), LineBreakMode::Ascii), TextPosition { line: 0, col: 3 });
        assert_eq!(TextPosition::at(text, text.len(), LineBreakMode::Unicode), TextPosition { line: 1, col: 1 });
    }

    #[test]
    fn text_position_display_is_one_based() -> () {
        assert_eq!(format!("{}", TextPosition { line: 4, col: 0 }), "5:1");
    }

    #[test]
    fn scan_error_kinds_are_distinguishable() -> () {
        let eoi = ScanError::out_of_range(3);
        assert!(eoi.is_out_of_range());
        assert!(!eoi.is_no_match());
        assert_eq!(eoi.get_position(), 3);
        assert_eq!(format!("{}", eoi), "unexpected end of input at offset 3");

        let no_match = ScanError::new(ScanErrorKind::NoMatch, 0);
        assert!(no_match.is_no_match());
        assert_eq!(format!("{}", no_match), "no match at offset 0");
    }
}
