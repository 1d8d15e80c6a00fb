use crate::classify::{CharClass, CharSet};
use crate::error::{ScanError, ScanErrorKind, ScanResult, TextPosition};
use crate::line_break::LineBreakMode;

use log::trace;
use regex::Regex;

/// Compiles `pattern` so that it only matches at the start of the text it is
/// applied to.
///
/// `looking_at` is anchored regardless of the pattern, but an anchored regex
/// lets the engine give up at the first position instead of scanning the
/// rest of the input for a match that would be rejected anyway.
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&["\\A(?:", pattern, ")"].concat())
}

/// Checks whether `rest` starts with `needle`. If it does not, the failure is
/// `OutOfRange` when `rest` holds fewer characters than `needle` and
/// `NoMatch` otherwise.
pub(crate) fn match_literal(rest: &str, needle: &str) -> Result<usize, ScanErrorKind> {
    if rest.starts_with(needle) {
        return Ok(needle.len());
    }
    let needed = needle.chars().count();
    if rest.chars().take(needed).count() < needed {
        Err(ScanErrorKind::OutOfRange)
    } else {
        Err(ScanErrorKind::NoMatch)
    }
}

/// A scanning position over an immutable text buffer.
///
/// The cursor borrows its input and only owns a byte offset into it, so
/// creating several cursors over the same text is cheap. The offset always
/// lies on a `char` boundary.
///
/// Operations come in two flavours:
/// * Runs (`many_*`, `skip_*`, `chars_till_string`, `rest_of_line`, ...)
///   consume the longest possible stretch of input and never fail. An empty
///   run is a valid result.
/// * Checked operations return a `ScanResult`. If they fail, the position is
///   exactly what it was before the call, so a caller can try the next
///   alternative without rewinding. Backtracking over several operations is
///   done by saving `position()` and restoring it with `set_position()`.
///
/// # Examples
///
/// ```
/// # use textcursor::TextCursor;
/// let mut cursor = TextCursor::new("aaa123\r\nbbb");
/// assert_eq!(cursor.many_lower_case(), "aaa");
/// assert_eq!(cursor.many_digit(), "123");
/// assert_eq!(cursor.rest_of_line(true), "\r\n");
/// assert_eq!(cursor.many_lower_case(), "bbb");
/// assert!(cursor.is_eof());
/// ```
#[derive(Clone, Debug)]
pub struct TextCursor<'a> {
    input: &'a str,
    pos: usize,
    line_breaks: LineBreakMode
}

impl<'a> TextCursor<'a> {

    /// Creates a cursor at the start of `input` that recognizes CRLF, LF and
    /// CR as line terminators.
    pub fn new(input: &'a str) -> TextCursor<'a> {
        TextCursor::with_line_breaks(input, LineBreakMode::default())
    }

    /// Creates a cursor at the start of `input` with the given line
    /// terminator definition.
    pub fn with_line_breaks(input: &'a str, line_breaks: LineBreakMode) -> TextCursor<'a> {
        TextCursor {
            input,
            pos: 0,
            line_breaks
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The part of the input that has not been consumed yet.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn line_breaks(&self) -> LineBreakMode {
        self.line_breaks
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to byte offset `pos`, usually one previously obtained
    /// from `position()`.
    ///
    /// Fails with `OutOfRange` if `pos` is past the end of the input or does
    /// not lie on a character boundary. The position is unchanged in that case.
    pub fn set_position(&mut self, pos: usize) -> ScanResult<()> {
        if pos > self.input.len() || !self.input.is_char_boundary(pos) {
            trace!("Refusing to move cursor to offset {} (input length {})", pos, self.input.len());
            return Err(ScanError::out_of_range(self.pos));
        }
        self.pos = pos;
        return Ok(());
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Line and column of the current position, for diagnostics.
    pub fn text_position(&self) -> TextPosition {
        TextPosition::at(self.input, self.pos, self.line_breaks)
    }

    /// Returns the next character without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn fail<T>(&self, kind: ScanErrorKind, operation: &str) -> ScanResult<T> {
        trace!("{} failed at offset {}: {}", operation, self.pos, kind);
        Err(ScanError::new(kind, self.pos))
    }

    /// Byte offset of the first character at or after the current position
    /// that does not satisfy `pred`, or the input length.
    fn run_end<P: Fn(char) -> bool>(&self, pred: P) -> usize {
        match self.remaining().char_indices().find(|&(_, c)| !pred(c)) {
            Some((i, _)) => self.pos + i,
            None => self.input.len()
        }
    }

    /// Byte offset just past the next `n` characters, or None if fewer than
    /// `n` characters remain.
    fn offset_after_chars(&self, n: usize) -> Option<usize> {
        if n == 0 {
            return Some(self.pos);
        }
        let mut count = 0;
        for (i, c) in self.remaining().char_indices() {
            count += 1;
            if count == n {
                return Some(self.pos + i + c.len_utf8());
            }
        }
        None
    }

    fn take_until(&mut self, end: usize) -> &'a str {
        let start = self.pos;
        self.pos = end;
        &self.input[start..end]
    }

    // Classification runs

    /// Consumes the maximal run of characters satisfying `pred` and returns it.
    pub fn many_satisfy<P: Fn(char) -> bool>(&mut self, pred: P) -> &'a str {
        let end = self.run_end(pred);
        self.take_until(end)
    }

    /// Like `many_satisfy`, but returns the number of bytes skipped.
    pub fn skip_satisfy<P: Fn(char) -> bool>(&mut self, pred: P) -> usize {
        self.many_satisfy(pred).len()
    }

    pub fn many_class(&mut self, class: CharClass) -> &'a str {
        self.many_satisfy(|c| class.matches(c))
    }

    pub fn many_alphabetic(&mut self) -> &'a str {
        self.many_class(CharClass::Alphabetic)
    }

    pub fn many_letter(&mut self) -> &'a str {
        self.many_class(CharClass::Letter)
    }

    pub fn many_digit(&mut self) -> &'a str {
        self.many_class(CharClass::Digit)
    }

    pub fn many_lower_case(&mut self) -> &'a str {
        self.many_class(CharClass::LowerCase)
    }

    pub fn many_upper_case(&mut self) -> &'a str {
        self.many_class(CharClass::UpperCase)
    }

    pub fn many_letter_or_digit(&mut self) -> &'a str {
        self.many_class(CharClass::LetterOrDigit)
    }

    pub fn many_white_space(&mut self) -> &'a str {
        self.many_class(CharClass::WhiteSpace)
    }

    pub fn skip_white_space(&mut self) -> () {
        self.many_white_space();
    }

    /// Skips white space and reports whether there was any.
    pub fn white_space1(&mut self) -> bool {
        !self.many_white_space().is_empty()
    }

    // Single character operations

    pub fn many_char(&mut self, c: char) -> &'a str {
        self.many_satisfy(|x| x == c)
    }

    /// Skips a run of `c` and returns the number of bytes skipped.
    pub fn skip_char(&mut self, c: char) -> usize {
        self.many_char(c).len()
    }

    /// Consumes a run of at least one `c`.
    pub fn many1_char(&mut self, c: char) -> ScanResult<&'a str> {
        if self.peek_char() != Some(c) {
            return self.fail(ScanErrorKind::NoMatch, "many1_char");
        }
        Ok(self.many_char(c))
    }

    /// Consumes the run of `c` found within the next `n` characters.
    ///
    /// Fails with `OutOfRange` if fewer than `n` characters remain, in which
    /// case nothing is consumed. Otherwise the result may be shorter than `n`
    /// characters, or empty, if `c` stops recurring.
    pub fn count_char(&mut self, n: usize, c: char) -> ScanResult<&'a str> {
        let stop = match self.offset_after_chars(n) {
            Some(stop) => stop,
            None => return self.fail(ScanErrorKind::OutOfRange, "count_char")
        };
        let end = self.run_end(|x| x == c).min(stop);
        Ok(self.take_until(end))
    }

    /// Consumes one character if it is `c`.
    pub fn char(&mut self, c: char) -> ScanResult<char> {
        match self.peek_char() {
            Some(x) if x == c => {
                self.pos += c.len_utf8();
                Ok(c)
            },
            Some(_) => self.fail(ScanErrorKind::NoMatch, "char"),
            None => self.fail(ScanErrorKind::OutOfRange, "char")
        }
    }

    /// Consumes one character of any value. Fails only at the end of input.
    pub fn any_char(&mut self) -> ScanResult<char> {
        match self.peek_char() {
            Some(c) => {
                self.pos += c.len_utf8();
                Ok(c)
            },
            None => self.fail(ScanErrorKind::OutOfRange, "any_char")
        }
    }

    // Literals and fixed width

    /// Consumes `s` if the input continues with exactly `s`.
    ///
    /// A literal with more characters than the remaining input fails with
    /// `OutOfRange`, any other mismatch with `NoMatch`.
    pub fn literal(&mut self, s: &str) -> ScanResult<&'a str> {
        match match_literal(self.remaining(), s) {
            Ok(len) => {
                let end = self.pos + len;
                Ok(self.take_until(end))
            },
            Err(kind) => self.fail(kind, "literal")
        }
    }

    /// Consumes exactly the next `n` characters.
    pub fn horizon(&mut self, n: usize) -> ScanResult<&'a str> {
        match self.offset_after_chars(n) {
            Some(end) => Ok(self.take_until(end)),
            None => self.fail(ScanErrorKind::OutOfRange, "horizon")
        }
    }

    /// Returns the next `n` characters without consuming them.
    pub fn peek_horizon(&self, n: usize) -> ScanResult<&'a str> {
        match self.offset_after_chars(n) {
            Some(end) => Ok(&self.input[self.pos..end]),
            None => self.fail(ScanErrorKind::OutOfRange, "peek_horizon")
        }
    }

    // Set membership

    pub fn many_one_of<S: CharSet + ?Sized>(&mut self, allowed: &S) -> &'a str {
        self.many_satisfy(|c| allowed.contains_char(c))
    }

    pub fn skip_one_of<S: CharSet + ?Sized>(&mut self, allowed: &S) -> usize {
        self.many_one_of(allowed).len()
    }

    pub fn many_none_of<S: CharSet + ?Sized>(&mut self, excluded: &S) -> &'a str {
        self.many_satisfy(|c| !excluded.contains_char(c))
    }

    pub fn skip_none_of<S: CharSet + ?Sized>(&mut self, excluded: &S) -> usize {
        self.many_none_of(excluded).len()
    }

    pub fn many_not_char(&mut self, c: char) -> &'a str {
        self.many_satisfy(|x| x != c)
    }

    pub fn skip_not_char(&mut self, c: char) -> usize {
        self.many_not_char(c).len()
    }

    // Searching

    /// Consumes everything up to, but not including, the next occurrence of
    /// `needle`. Consumes the rest of the input if `needle` does not occur.
    pub fn chars_till_string(&mut self, needle: &str) -> &'a str {
        let end = match self.remaining().find(needle) {
            Some(i) => self.pos + i,
            None => self.input.len()
        };
        self.take_until(end)
    }

    pub fn skip_chars_till_string(&mut self, needle: &str) -> usize {
        self.chars_till_string(needle).len()
    }

    /// Consumes the text matched by `pattern` if it matches at the current
    /// position. The match is anchored: a match further ahead does not count.
    ///
    /// Build `pattern` with `anchored`. A pattern without `\A` still works,
    /// but a failed call then searches the whole remaining input first.
    ///
    /// ```
    /// # use textcursor::{TextCursor, anchored};
    /// let number = anchored(r"[0-9]+(\.[0-9]+)?").unwrap();
    /// let mut cursor = TextCursor::new("3.14 rad");
    /// assert_eq!(cursor.looking_at(&number), Ok("3.14"));
    /// assert!(cursor.looking_at(&number).is_err());
    /// assert_eq!(cursor.position(), 4);
    /// ```
    pub fn looking_at(&mut self, pattern: &Regex) -> ScanResult<&'a str> {
        match pattern.find(self.remaining()) {
            Some(m) if m.start() == 0 => {
                let end = self.pos + m.end();
                Ok(self.take_until(end))
            },
            _ => self.fail(ScanErrorKind::NoMatch, "looking_at")
        }
    }

    // Lines

    /// End of the current line and the start of the following one, or the
    /// input length twice if no terminator remains.
    fn line_bounds(&self) -> (usize, usize) {
        match self.line_breaks.find_line_break(self.remaining()) {
            Some((start, end)) => (self.pos + start, self.pos + end),
            None => (self.input.len(), self.input.len())
        }
    }

    /// Consumes the rest of the current line. With `consume_eol`, the line
    /// terminator is consumed and returned as well. Without a terminator in
    /// the remaining input, consumes everything.
    pub fn rest_of_line(&mut self, consume_eol: bool) -> &'a str {
        let (eol_start, eol_end) = self.line_bounds();
        self.take_until(if consume_eol { eol_end } else { eol_start })
    }

    /// Like `rest_of_line`, but returns the number of bytes skipped.
    pub fn skip_rest_of_line(&mut self, consume_eol: bool) -> usize {
        self.rest_of_line(consume_eol).len()
    }

    /// The rest of the current line without its terminator. Does not move
    /// the cursor.
    pub fn peek_rest_of_line(&self) -> &'a str {
        let (eol_start, _) = self.line_bounds();
        &self.input[self.pos..eol_start]
    }

    /// Consumes a single line terminator.
    pub fn line_break(&mut self) -> ScanResult<&'a str> {
        if self.is_eof() {
            return self.fail(ScanErrorKind::OutOfRange, "line_break");
        }
        match self.line_breaks.line_break_len(self.remaining()) {
            Some(len) => {
                let end = self.pos + len;
                Ok(self.take_until(end))
            },
            None => self.fail(ScanErrorKind::NoMatch, "line_break")
        }
    }
}
