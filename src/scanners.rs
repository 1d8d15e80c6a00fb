//! Stateless scanning functions over an explicit `(src, offset)` pair.
//!
//! These mirror the runs of `TextCursor` for callers that keep their own
//! position variable. `many_*` functions return the consumed text and
//! `skip_*` functions return the offset just past it; nothing is mutated.
//!
//! Offsets are byte offsets. An offset that is past the end of `src` or not on
//! a character boundary is treated as having nothing left to scan: runs come
//! back empty and `skip_*` returns the offset unchanged. `check_offset` can be
//! used to validate an offset up front.

use crate::classify::{CharClass, CharSet};
use crate::cursor::match_literal;
use crate::error::{ScanError, ScanErrorKind, ScanResult};
use crate::line_break::LineBreakMode;

use log::trace;

/// Fails with `OutOfRange` if `offset` is not a valid position in `src`.
pub fn check_offset(src: &str, offset: usize) -> ScanResult<()> {
    if offset <= src.len() && src.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(ScanError::out_of_range(offset))
    }
}

fn rest(src: &str, offset: usize) -> &str {
    src.get(offset..).unwrap_or("")
}

/// End offset of the maximal run starting at `offset` whose characters all
/// satisfy `pred`.
fn run_end<P: Fn(char) -> bool>(src: &str, offset: usize, pred: P) -> usize {
    let tail = rest(src, offset);
    match tail.char_indices().find(|&(_, c)| !pred(c)) {
        Some((i, _)) => offset + i,
        None => offset + tail.len()
    }
}

fn slice_run(src: &str, offset: usize, end: usize) -> &str {
    src.get(offset..end).unwrap_or("")
}

pub fn many_satisfy<P: Fn(char) -> bool>(src: &str, offset: usize, pred: P) -> &str {
    slice_run(src, offset, run_end(src, offset, pred))
}

pub fn skip_satisfy<P: Fn(char) -> bool>(src: &str, offset: usize, pred: P) -> usize {
    run_end(src, offset, pred)
}

pub fn many_class(src: &str, offset: usize, class: CharClass) -> &str {
    many_satisfy(src, offset, |c| class.matches(c))
}

pub fn skip_class(src: &str, offset: usize, class: CharClass) -> usize {
    skip_satisfy(src, offset, |c| class.matches(c))
}

/// # Examples
///
/// ```
/// # use textcursor::scanners::{many_alphabetic, skip_alphabetic};
/// assert_eq!(many_alphabetic("let x", 0), "let");
/// assert_eq!(skip_alphabetic("let x", 0), 3);
/// assert_eq!(many_alphabetic("let x", 3), "");
/// ```
pub fn many_alphabetic(src: &str, offset: usize) -> &str {
    many_class(src, offset, CharClass::Alphabetic)
}

pub fn skip_alphabetic(src: &str, offset: usize) -> usize {
    skip_class(src, offset, CharClass::Alphabetic)
}

pub fn many_chars(src: &str, offset: usize, c: char) -> &str {
    many_satisfy(src, offset, |x| x == c)
}

pub fn skip_chars(src: &str, offset: usize, c: char) -> usize {
    skip_satisfy(src, offset, |x| x == c)
}

pub fn many_not_char(src: &str, offset: usize, c: char) -> &str {
    many_satisfy(src, offset, |x| x != c)
}

pub fn skip_not_char(src: &str, offset: usize, c: char) -> usize {
    skip_satisfy(src, offset, |x| x != c)
}

pub fn many_one_of<'a, S: CharSet + ?Sized>(src: &'a str, offset: usize, allowed: &S) -> &'a str {
    many_satisfy(src, offset, |c| allowed.contains_char(c))
}

pub fn skip_one_of<S: CharSet + ?Sized>(src: &str, offset: usize, allowed: &S) -> usize {
    skip_satisfy(src, offset, |c| allowed.contains_char(c))
}

pub fn many_none_of<'a, S: CharSet + ?Sized>(src: &'a str, offset: usize, excluded: &S) -> &'a str {
    many_satisfy(src, offset, |c| !excluded.contains_char(c))
}

pub fn skip_none_of<S: CharSet + ?Sized>(src: &str, offset: usize, excluded: &S) -> usize {
    skip_satisfy(src, offset, |c| !excluded.contains_char(c))
}

/// Offset of the next occurrence of `needle` at or after `offset`, or the
/// end of `src`.
pub fn skip_chars_till_string(src: &str, offset: usize, needle: &str) -> usize {
    let tail = rest(src, offset);
    match tail.find(needle) {
        Some(i) => offset + i,
        None => offset + tail.len()
    }
}

pub fn chars_till_string<'a>(src: &'a str, offset: usize, needle: &str) -> &'a str {
    slice_run(src, offset, skip_chars_till_string(src, offset, needle))
}

/// Offset just past the rest of the current line, recognizing line
/// terminators according to `mode`. The terminator is only skipped with
/// `consume_eol`.
pub fn skip_rest_of_line_in(mode: LineBreakMode, src: &str, offset: usize, consume_eol: bool) -> usize {
    let tail = rest(src, offset);
    match mode.find_line_break(tail) {
        Some((_, end)) if consume_eol => offset + end,
        Some((start, _)) => offset + start,
        None => offset + tail.len()
    }
}

pub fn rest_of_line_in(mode: LineBreakMode, src: &str, offset: usize, consume_eol: bool) -> &str {
    slice_run(src, offset, skip_rest_of_line_in(mode, src, offset, consume_eol))
}

/// Offset just past the rest of the current line, using the default
/// CRLF / LF / CR terminators.
pub fn skip_rest_of_line(src: &str, offset: usize, consume_eol: bool) -> usize {
    skip_rest_of_line_in(LineBreakMode::default(), src, offset, consume_eol)
}

/// # Examples
///
/// ```
/// # use textcursor::scanners::rest_of_line;
/// let src = "first\r\nsecond";
/// assert_eq!(rest_of_line(src, 0, false), "first");
/// assert_eq!(rest_of_line(src, 0, true), "first\r\n");
/// assert_eq!(rest_of_line(src, 7, true), "second");
/// ```
pub fn rest_of_line(src: &str, offset: usize, consume_eol: bool) -> &str {
    rest_of_line_in(LineBreakMode::default(), src, offset, consume_eol)
}

/// Matches `needle` at `offset` and returns the matched text.
///
/// Fails with `OutOfRange` if `offset` is invalid or `needle` has more
/// characters than what remains, and with `NoMatch` otherwise. An empty
/// `needle` matches everywhere and returns `Ok("")`.
pub fn literal<'a>(src: &'a str, offset: usize, needle: &str) -> ScanResult<&'a str> {
    check_offset(src, offset)?;
    let tail = &src[offset..];
    match match_literal(tail, needle) {
        Ok(len) => Ok(&tail[..len]),
        Err(kind) => {
            if kind == ScanErrorKind::OutOfRange {
                trace!("literal {:?} runs past the end of input at offset {}", needle, offset);
            } else {
                trace!("literal {:?} does not match at offset {}", needle, offset);
            }
            Err(ScanError::new(kind, offset))
        }
    }
}

/// Like `literal`, but returns the offset just past the match.
pub fn skip_literal(src: &str, offset: usize, needle: &str) -> ScanResult<usize> {
    literal(src, offset, needle).map(|matched| offset + matched.len())
}
