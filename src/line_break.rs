use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MODE_ASCII: &'static str = "ascii";
const MODE_UNICODE: &'static str = "unicode";

/// Selects which character sequences count as a line terminator for the
/// line-oriented scanning operations.
///
/// In both modes a CRLF pair is a single terminator, never two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineBreakMode {
    /// CRLF, LF and CR.
    Ascii,

    /// Everything `Ascii` recognizes, plus VT (U+000B), FF (U+000C),
    /// NEL (U+0085), LINE SEPARATOR (U+2028) and PARAGRAPH SEPARATOR (U+2029).
    Unicode
}

impl Default for LineBreakMode {

    fn default() -> LineBreakMode {
        LineBreakMode::Ascii
    }
}

impl LineBreakMode {

    /// Returns true if `c` on its own terminates a line in this mode.
    pub fn is_line_break_char(&self, c: char) -> bool {
        match self {
            LineBreakMode::Ascii => c == '\n' || c == '\r',
            LineBreakMode::Unicode => matches!(c, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
        }
    }

    /// If `text` starts with a line terminator, returns its length in bytes.
    pub fn line_break_len(&self, text: &str) -> Option<usize> {
        if text.starts_with("\r\n") {
            return Some(2);
        }
        match text.chars().next() {
            Some(c) if self.is_line_break_char(c) => Some(c.len_utf8()),
            _ => None
        }
    }

    /// Finds the first line terminator in `text` and returns its byte range
    /// as `(start, end)`.
    pub fn find_line_break(&self, text: &str) -> Option<(usize, usize)> {
        let start = text.find(|c: char| self.is_line_break_char(c))?;
        let len = self.line_break_len(&text[start..])?;
        Some((start, start + len))
    }
}

impl Display for LineBreakMode {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LineBreakMode::Ascii => write!(f, "{}", MODE_ASCII),
            LineBreakMode::Unicode => write!(f, "{}", MODE_UNICODE)
        }
    }
}

/// Error returned when a string does not name a `LineBreakMode`.
#[derive(Debug, PartialEq)]
pub struct UnknownLineBreakMode(pub String);

impl Display for UnknownLineBreakMode {

    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown line break mode '{}', expected '{}' or '{}'", self.0, MODE_ASCII, MODE_UNICODE)
    }
}

impl std::error::Error for UnknownLineBreakMode {}

impl FromStr for LineBreakMode {
    type Err = UnknownLineBreakMode;

    fn from_str(s: &str) -> Result<LineBreakMode, UnknownLineBreakMode> {
        match s.trim() {
            MODE_ASCII => Ok(LineBreakMode::Ascii),
            MODE_UNICODE => Ok(LineBreakMode::Unicode),
            other => Err(UnknownLineBreakMode(other.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {

    use super::{LineBreakMode, UnknownLineBreakMode};

    #[test]
    fn crlf_is_one_terminator() -> () {
        assert_eq!(LineBreakMode::Ascii.line_break_len("\r\nabc"), Some(2));
        assert_eq!(LineBreakMode::Unicode.line_break_len("\r\nabc"), Some(2));
        assert_eq!(LineBreakMode::Ascii.line_break_len("\n\r"), Some(1));
        assert_eq!(LineBreakMode::Ascii.line_break_len("\rabc"), Some(1));
        assert_eq!(LineBreakMode::Ascii.line_break_len("abc"), None);
        assert_eq!(LineBreakMode::Ascii.line_break_len(""), None);
    }

    #[test]
    fn unicode_mode_knows_more_terminators() -> () {
        for s in &["\u{0B}", "\u{0C}", "\u{85}", "\u{2028}", "\u{2029}"] {
            assert_eq!(LineBreakMode::Ascii.line_break_len(s), None);
            assert_eq!(LineBreakMode::Unicode.line_break_len(s), Some(s.len()));
        }
    }

    #[test]
    fn find_line_break_returns_byte_range() -> () {
        assert_eq!(LineBreakMode::Ascii.find_line_break("ab\r\ncd"), Some((2, 4)));
        assert_eq!(LineBreakMode::Ascii.find_line_break("äb\ncd"), Some((3, 4)));
        assert_eq!(LineBreakMode::Ascii.find_line_break("a\u{2029}b"), None);
        assert_eq!(LineBreakMode::Unicode.find_line_break("a\u{2029}b"), Some((1, 4)));
        assert_eq!(LineBreakMode::Ascii.find_line_break(""), None);
    }

    #[test]
    fn line_break_mode_parses_from_config_names() -> () {
        assert_eq!("ascii".parse::<LineBreakMode>(), Ok(LineBreakMode::Ascii));
        assert_eq!(" unicode ".parse::<LineBreakMode>(), Ok(LineBreakMode::Unicode));
        assert_eq!("crlf".parse::<LineBreakMode>(), Err(UnknownLineBreakMode("crlf".to_owned())));
        assert_eq!(LineBreakMode::default().to_string(), "ascii");
    }
}
