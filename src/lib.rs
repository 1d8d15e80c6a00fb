//! Scanning primitives for hand-written recursive-descent parsers.
//!
//! `TextCursor` owns a position in a borrowed text buffer and offers
//! "consume while" operations on it. The `scanners` module has the same
//! runs as free functions over an explicit `(src, offset)` pair.
//!
//! Checked operations report failure as a `ScanError` and never move the
//! position when they fail.

pub mod classify;
pub mod cli;
pub mod cursor;
pub mod error;
pub mod line_break;
pub mod report;
pub mod scanners;
pub mod source;

pub use classify::{CharClass, CharSet};
pub use cursor::{anchored, TextCursor};
pub use error::{ScanError, ScanErrorKind, ScanResult, SourceError, TextPosition};
pub use line_break::LineBreakMode;
pub use source::Source;
