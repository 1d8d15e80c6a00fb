use log::trace;
use crossterm::QueueableCommand;
use crossterm::style::{Print, SetForegroundColor, Color};

use std::collections::HashMap;
use std::io::Write;
use std::fmt::Display;

/// Roles of text in the `textscan` output, mapped to a palette entry.
#[derive(Debug, Clone, Copy)]
pub enum TermColor {
    /// Option names and file names
    Primary,

    /// Descriptions and secondary figures
    Secondary,

    /// Numbers in a report
    Highlight,

    /// Error messages
    Error
}

/// Color modes for a ColorTerminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TermColorMode {
    /// Never emit color codes.
    None,

    /// Use the 8-color palette.
    C8,

    /// Use the 256-color palette.
    C256
}

const PALETTE_256: [Color; 4] = [
    Color::AnsiValue(39),   // Primary: rgb(0,175,255)
    Color::AnsiValue(244),  // Secondary: rgb(128,128,128)
    Color::AnsiValue(214),  // Highlight: rgb(255,175,0)
    Color::AnsiValue(196),  // Error: rgb(255,0,0)
];

const PALETTE_8: [Color; 4] = [
    Color::Cyan,
    Color::Grey,
    Color::Yellow,
    Color::Red
];

/// Output target for reports and usage texts.
pub trait Terminal {

    /// Returns the current size of the terminal as (columns, rows)
    fn size(&self) -> std::io::Result<(usize, usize)>;

    fn set_color_fg(&mut self, color: &TermColor) -> std::io::Result<()>;

    fn reset_color(&mut self) -> std::io::Result<()>;

    /// Queues text for output. Nothing is guaranteed to be visible before
    /// the next call to flush().
    fn write<D: Display>(&mut self, buf: D) -> std::io::Result<()>;

    fn flush(&mut self) -> std::io::Result<()>;
}

/// Terminal on stdout which may or may not use color.
pub struct ColorTerminal {
    stdout: std::io::Stdout,
    color_mode: TermColorMode
}

impl ColorTerminal {

    /// Creates a new ColorTerminal. The `color_mode` is trusted, it is not
    /// checked against what the terminal supports.
    pub fn new(color_mode: TermColorMode) -> ColorTerminal {
        ColorTerminal {
            stdout: std::io::stdout(),
            color_mode
        }
    }

    fn palette_index(color: &TermColor) -> usize {
        match color {
            TermColor::Primary => 0,
            TermColor::Secondary => 1,
            TermColor::Highlight => 2,
            TermColor::Error => 3
        }
    }
}

impl Terminal for ColorTerminal {

    fn size(&self) -> std::io::Result<(usize, usize)> {
        let (w, h) = crossterm::terminal::size()?;
        Ok((w as usize, h as usize))
    }

    fn set_color_fg(&mut self, color: &TermColor) -> std::io::Result<()> {
        let palette_color = match self.color_mode {
            TermColorMode::None => return Ok(()),
            TermColorMode::C256 => PALETTE_256[ColorTerminal::palette_index(color)],
            TermColorMode::C8 => PALETTE_8[ColorTerminal::palette_index(color)]
        };
        self.stdout.queue(SetForegroundColor(palette_color))?;
        Ok(())
    }

    fn reset_color(&mut self) -> std::io::Result<()> {
        if self.color_mode == TermColorMode::None {
            return Ok(());
        }
        self.stdout.queue(SetForegroundColor(Color::Reset))?;
        Ok(())
    }

    fn write<D: Display>(&mut self, buf: D) -> std::io::Result<()> {
        self.stdout.queue(Print(buf))?;
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()
    }
}

/// Terminal that collects everything written to it in a String. Colors are
/// ignored. Used to check output in tests.
pub struct StringTerminal {
    pub buffer: String,
    pub size: (usize, usize)
}

impl StringTerminal {

    /// Creates a new StringTerminal with the given (columns, rows) `size`.
    pub fn new(size: (usize, usize)) -> StringTerminal {
        StringTerminal {
            buffer: String::new(),
            size
        }
    }
}

impl Terminal for StringTerminal {

    fn size(&self) -> std::io::Result<(usize, usize)> {
        Ok(self.size)
    }

    fn set_color_fg(&mut self, _color: &TermColor) -> std::io::Result<()> { Ok(()) }

    fn reset_color(&mut self) -> std::io::Result<()> { Ok(()) }

    fn write<D: Display>(&mut self, buf: D) -> std::io::Result<()> {
        self.buffer.push_str(&buf.to_string());
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

/// Writes `len` spaces to a Terminal.
///
/// # Examples
///
/// ```
/// # use textcursor::cli::{StringTerminal, write_blanks};
/// let mut terminal = StringTerminal::new((80, 40));
/// write_blanks(&mut terminal, 4).unwrap();
/// assert_eq!(terminal.buffer, "    ");
/// ```
pub fn write_blanks<T: Terminal>(terminal: &mut T, len: usize) -> std::io::Result<()> {
    terminal.write(" ".repeat(len))
}

/// Splits `text` into lines of at most `max_len` characters. Explicit
/// newlines always break. Overlong lines break at their last space, or hard
/// at `max_len` if they contain none.
fn wrap_lines(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut out = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split(' ') {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > max_len {
                out.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            for c in word.chars() {
                if line_len >= max_len {
                    out.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                line.push(c);
                line_len += 1;
            }
        }
        out.push(line);
    }

    return out;
}

/// A single option understood by an ArgTemplate
pub struct Arg {
    short: Option<String>,
    long: String,
    description: String,
    parameter: Option<String>
}

impl Arg {

    /// Creates a new Arg with the given `long` name and `description`.
    pub fn new(long: &str, description: &str) -> Arg {
        Arg {
            short: None,
            long: String::from(long),
            description: String::from(description),
            parameter: None
        }
    }

    pub fn short(mut self, short: &str) -> Arg {
        self.short = Some(String::from(short));
        return self;
    }

    /// Makes the Arg take a parameter, shown as `parameter` in the usage.
    pub fn parameter(mut self, parameter: &str) -> Arg {
        self.parameter = Some(String::from(parameter));
        return self;
    }

    fn matches(&self, name: &str) -> bool {
        self.long == name || self.short.as_ref().map_or(false, |s| s == name)
    }
}

/// Options and positional arguments parsed by `ArgTemplate::parse_args`.
#[derive(Debug)]
pub struct ArgResult {
    args: HashMap<String, String>,
    rest: Vec<String>
}

impl ArgResult {

    /// Returns the value given for the option with the long name `arg`.
    /// Options without a parameter yield Some("") when present.
    pub fn get_argument<'a>(&'a self, arg: &str) -> Option<&'a str> {
        self.args.get(arg).map(|val| val.as_str())
    }

    pub fn has_argument(&self, arg: &str) -> bool {
        self.args.contains_key(arg)
    }

    /// Positional arguments, in the order they were given.
    pub fn get_rest(&self) -> &Vec<String> {
        &self.rest
    }
}

/// The options an application accepts, plus the text around its usage.
pub struct ArgTemplate {
    args: Vec<Arg>,
    usage_header: String,
    usage_trailer: String
}

/// Error returned when the command line does not fit the ArgTemplate.
#[derive(Debug, PartialEq)]
pub struct ArgError(pub String);

impl ArgTemplate {

    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            usage_header: String::new(),
            usage_trailer: String::new()
        }
    }

    pub fn set_usage_header(mut self, header: &str) -> Self {
        self.usage_header = String::from(header);
        return self;
    }

    pub fn set_usage_trailer(mut self, trailer: &str) -> Self {
        self.usage_trailer = String::from(trailer);
        return self;
    }

    pub fn add_argument(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        return self;
    }

    /// Width of the widest short name, and of the widest long name together
    /// with its parameter.
    fn column_widths(&self) -> (usize, usize) {
        self.args.iter()
            .map(|arg| {
                let short_len = arg.short.as_ref().map_or(0, |s| s.len());
                let param_len = arg.parameter.as_ref().map_or(0, |s| s.len() + 1);
                (short_len, arg.long.len() + param_len)
            })
            .fold((0, 0), |(short_acc, long_acc), (short_len, long_len)|
                (short_acc.max(short_len), long_acc.max(long_len)))
    }

    /// Writes the usage text, listing every option with its description.
    ///
    /// # Examples
    ///
    /// ```
    /// # use textcursor::cli::{StringTerminal, Arg, ArgTemplate};
    /// let mut terminal = StringTerminal::new((60, 40));
    /// let arg_template = ArgTemplate::new()
    ///     .set_usage_header("header")
    ///     .add_argument(Arg::new("--json", "Print JSON").short("-j"))
    ///     .add_argument(Arg::new("--encoding", "Encoding of the input files, as a WHATWG label").parameter("<label>"))
    ///     .set_usage_trailer("trailer");
    /// let reference = "\
    /// header
    ///
    /// USAGE:
    ///     prog [OPTIONS] files...
    ///
    /// OPTIONS:
    ///     -j, --json             Print JSON
    ///         --encoding <label> Encoding of the input files, as a
    ///                            WHATWG label
    ///
    /// trailer
    /// ";
    /// arg_template.write_usage(&mut terminal, "prog").unwrap();
    /// assert_eq!(terminal.buffer, reference);
    /// ```
    pub fn write_usage<T: Terminal>(&self, terminal: &mut T, program_name: &str) -> std::io::Result<()> {
        trace!("Printing usage...");
        let indentation = 4;
        let (term_width, _) = terminal.size()?;
        let (short_len, long_len) = self.column_widths();
        let description_col = (indentation + short_len + 2 + long_len + 1).min(term_width / 2);

        terminal.reset_color()?;
        terminal.write(format!("{}\n\nUSAGE:\n", self.usage_header))?;
        write_blanks(terminal, indentation)?;
        terminal.write(format!("{} [OPTIONS] files...\n\nOPTIONS:\n", program_name))?;

        for arg in &self.args {
            write_blanks(terminal, indentation)?;
            terminal.set_color_fg(&TermColor::Primary)?;

            match &arg.short {
                Some(short) => {
                    terminal.write(format!("{},", short))?;
                    write_blanks(terminal, short_len - short.len() + 1)?;
                },
                None => write_blanks(terminal, short_len + 2)?
            }

            let long = match &arg.parameter {
                Some(parameter) => format!("{} {}", arg.long, parameter),
                None => arg.long.clone()
            };
            terminal.write(&long)?;

            let current_col = indentation + short_len + 2 + long.len();
            if current_col >= description_col {
                terminal.write("\n")?;
                write_blanks(terminal, description_col)?;
            } else {
                write_blanks(terminal, description_col - current_col)?;
            }

            terminal.set_color_fg(&TermColor::Secondary)?;
            let lines = wrap_lines(&arg.description, term_width.saturating_sub(description_col));
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    write_blanks(terminal, description_col)?;
                }
                terminal.write(format!("{}\n", line))?;
            }
        }

        terminal.reset_color()?;
        terminal.write(format!("\n{}\n", self.usage_trailer))?;
        terminal.flush()?;
        return Ok(());
    }

    /// Parses a command line (including the program name as first item).
    ///
    /// Options taking a parameter accept it either as the next item or
    /// attached with `=`. Anything that is not an option is collected as a
    /// positional argument.
    ///
    /// # Examples
    ///
    /// ```
    /// # use textcursor::cli::{Arg, ArgTemplate};
    /// let arg_template = ArgTemplate::new()
    ///     .add_argument(Arg::new("--json", "JSON output").short("-j"))
    ///     .add_argument(Arg::new("--encoding", "Input encoding").parameter("<label>"));
    ///
    /// let res = arg_template.parse_args(vec!["prog", "-j", "a.txt", "--encoding=latin1", "b.txt"]).unwrap();
    /// assert_eq!(res.get_argument("--json"), Some(""));
    /// assert_eq!(res.get_argument("--encoding"), Some("latin1"));
    /// assert_eq!(res.get_rest(), &vec![String::from("a.txt"), String::from("b.txt")]);
    /// ```
    pub fn parse_args<T>(&self, args_iter: T) -> Result<ArgResult, ArgError>
    where
        T: IntoIterator,
        T::Item: AsRef<str> {
        let mut iter = args_iter.into_iter().skip(1);
        let mut out = ArgResult {
            args: HashMap::new(),
            rest: Vec::new()
        };

        while let Some(item) = iter.next() {
            let item = item.as_ref();
            let (name, attached) = match item.find('=') {
                Some(i) if item.starts_with('-') => (&item[..i], Some(&item[i + 1..])),
                _ => (item, None)
            };

            let arg = match self.args.iter().find(|arg| arg.matches(name)) {
                Some(arg) => arg,
                None => {
                    out.rest.push(String::from(item));
                    continue;
                }
            };

            let value = match (&arg.parameter, attached) {
                (Some(_), Some(value)) => String::from(value),
                (Some(_), None) => match iter.next() {
                    Some(value) => String::from(value.as_ref()),
                    None => return Err(ArgError(format!("Missing required argument for {}", arg.long)))
                },
                (None, Some(_)) => return Err(ArgError(format!("{} does not take an argument", arg.long))),
                (None, None) => String::new()
            };
            out.args.insert(arg.long.clone(), value);
        }

        return Ok(out);
    }
}

#[cfg(test)]
mod tests {

    use super::{wrap_lines, Arg, ArgError, ArgTemplate};

    #[test]
    fn wrap_lines_breaks_at_spaces_and_newlines() -> () {
        assert_eq!(wrap_lines("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_lines("a\nb c", 10), vec!["a", "b c"]);
        assert_eq!(wrap_lines("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_lines("", 10), vec![""]);
    }

    #[test]
    fn parse_args_reports_missing_parameter() -> () {
        let arg_template = ArgTemplate::new()
            .add_argument(Arg::new("--log-level", "Log level").short("-ll").parameter("<level>"));
        let res = arg_template.parse_args(vec!["prog", "file", "-ll"]);
        assert_eq!(res.unwrap_err(), ArgError(String::from("Missing required argument for --log-level")));
    }

    #[test]
    fn parse_args_rejects_value_for_flag() -> () {
        let arg_template = ArgTemplate::new()
            .add_argument(Arg::new("--json", "JSON output"));
        let res = arg_template.parse_args(vec!["prog", "--json=yes"]);
        assert_eq!(res.unwrap_err(), ArgError(String::from("--json does not take an argument")));
    }

    #[test]
    fn parse_args_short_names_with_parameters() -> () {
        let arg_template = ArgTemplate::new()
            .add_argument(Arg::new("--log-level", "Log level").short("-ll").parameter("<level>"));
        let res = arg_template.parse_args(vec!["prog", "-ll", "trace", "x=y"]).unwrap();
        assert_eq!(res.get_argument("--log-level"), Some("trace"));
        assert!(res.has_argument("--log-level"));
        assert_eq!(res.get_rest(), &vec![String::from("x=y")]);
    }
}
