use crate::classify::CharClass;
use crate::cli::{TermColor, Terminal};
use crate::cursor::{anchored, TextCursor};
use crate::error::ScanResult;
use crate::source::Source;

use log::trace;
use regex::Regex;
use serde_json::{json, Value};

const NUMBER_PATTERN: &'static str = r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?";

/// Token counts for a single scanned source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub lines: usize,
    pub blank_lines: usize,
    pub words: usize,
    pub numbers: usize,
    pub strings: usize,
    pub comments: usize,
    pub symbols: usize,
    /// Length of the longest line in characters, without its terminator.
    pub longest_line: usize
}

impl FileReport {

    pub fn new(name: &str) -> FileReport {
        FileReport {
            name: name.to_owned(),
            ..FileReport::default()
        }
    }

    /// Adds the counts of `other` to this report. The longest line is the
    /// longer of the two.
    pub fn add(&mut self, other: &FileReport) -> &mut Self {
        self.lines += other.lines;
        self.blank_lines += other.blank_lines;
        self.words += other.words;
        self.numbers += other.numbers;
        self.strings += other.strings;
        self.comments += other.comments;
        self.symbols += other.symbols;
        self.longest_line = self.longest_line.max(other.longest_line);
        return self;
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "lines": self.lines,
            "blankLines": self.blank_lines,
            "words": self.words,
            "numbers": self.numbers,
            "strings": self.strings,
            "comments": self.comments,
            "symbols": self.symbols,
            "longestLine": self.longest_line
        })
    }
}

/// Splits a source into lines and counts the tokens on each of them.
///
/// Recognized tokens are words (a letter or `_` followed by letters, digits
/// and `_`), numbers, double quoted strings that end on the same line, and
/// `//` comments running to the end of the line. Every other non-blank
/// character is a symbol.
pub struct LineScanner {
    number: Regex
}

impl LineScanner {

    pub fn new() -> Result<LineScanner, regex::Error> {
        Ok(LineScanner {
            number: anchored(NUMBER_PATTERN)?
        })
    }

    /// Scans all of `source` and returns its counts.
    pub fn scan_source(&self, source: &Source) -> ScanResult<FileReport> {
        trace!("Scanning {}...", source.get_name());
        let mut report = FileReport::new(source.get_name());
        let mut cursor = source.cursor();

        while !cursor.is_eof() {
            let line = cursor.rest_of_line(false);
            if cursor.line_break().is_err() {
                trace!("Last line of {} has no terminator", source.get_name());
            }

            report.lines += 1;
            report.longest_line = report.longest_line.max(line.chars().count());
            self.scan_line(&mut TextCursor::with_line_breaks(line, cursor.line_breaks()), &mut report)?;
        }

        return Ok(report);
    }

    fn scan_line(&self, cursor: &mut TextCursor, report: &mut FileReport) -> ScanResult<()> {
        cursor.skip_white_space();
        if cursor.is_eof() {
            report.blank_lines += 1;
            return Ok(());
        }

        while !cursor.is_eof() {
            if cursor.literal("//").is_ok() {
                cursor.rest_of_line(false);
                report.comments += 1;
            } else if self.scan_string(cursor)? {
                report.strings += 1;
            } else if cursor.looking_at(&self.number).is_ok() {
                report.numbers += 1;
            } else if !cursor.many_satisfy(|c| CharClass::Letter.matches(c) || c == '_').is_empty() {
                cursor.many_satisfy(|c| CharClass::LetterOrDigit.matches(c) || c == '_');
                report.words += 1;
            } else {
                cursor.any_char()?;
                report.symbols += 1;
            }
            cursor.skip_white_space();
        }

        return Ok(());
    }

    /// Consumes a string literal if one starts here. An opening quote
    /// without a closing one is left alone, so it gets counted as a symbol.
    fn scan_string(&self, cursor: &mut TextCursor) -> ScanResult<bool> {
        let start = cursor.position();
        if cursor.char('"').is_err() {
            return Ok(false);
        }
        cursor.chars_till_string("\"");
        if cursor.char('"').is_ok() {
            return Ok(true);
        }
        trace!("Unterminated string at {}", cursor.text_position());
        cursor.set_position(start)?;
        return Ok(false);
    }
}

/// Writes one line per report plus a total line, if there is more than one
/// report.
pub fn write_reports<T: Terminal>(reports: &[FileReport], terminal: &mut T) -> std::io::Result<()> {
    for report in reports {
        write_report_line(report, terminal)?;
    }

    if reports.len() > 1 {
        let mut total = FileReport::new("total");
        for report in reports {
            total.add(report);
        }
        write_report_line(&total, terminal)?;
    }

    terminal.flush()?;
    return Ok(());
}

fn write_report_line<T: Terminal>(report: &FileReport, terminal: &mut T) -> std::io::Result<()> {
    terminal.set_color_fg(&TermColor::Primary)?;
    terminal.write(format!("{}:", report.name))?;

    let figures = [
        ("lines", report.lines),
        ("blank", report.blank_lines),
        ("words", report.words),
        ("numbers", report.numbers),
        ("strings", report.strings),
        ("comments", report.comments),
        ("symbols", report.symbols),
        ("longest", report.longest_line)
    ];
    for (label, value) in figures.iter() {
        terminal.set_color_fg(&TermColor::Highlight)?;
        terminal.write(format!(" {}", value))?;
        terminal.set_color_fg(&TermColor::Secondary)?;
        terminal.write(format!(" {}", label))?;
    }

    terminal.reset_color()?;
    terminal.write("\n")?;
    return Ok(());
}

/// Serializes reports as a JSON array.
pub fn reports_to_json(reports: &[FileReport]) -> Value {
    Value::Array(reports.iter().map(FileReport::to_json).collect())
}
