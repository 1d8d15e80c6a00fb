use textcursor::cli::{Terminal, ColorTerminal, TermColorMode, TermColor, ArgTemplate, Arg, ArgError, ArgResult};
use textcursor::line_break::LineBreakMode;
use textcursor::report::{FileReport, LineScanner, write_reports, reports_to_json};
use textcursor::source::{DEFAULT_ENCODING_LABEL, encoding_for_label, load_source};

use encoding_rs::Encoding;
use glob::glob;
use log::{trace, debug, error, LevelFilter};
use simplelog::{Config, ConfigBuilder, CombinedLogger, TermLogger, WriteLogger, ColorChoice, TerminalMode};
use atty::Stream;
use tokio::runtime::Builder;

use std::process::{Command, exit};
use std::path::PathBuf;
use std::str::FromStr;

const ENV_LOG_LEVEL: &'static str = "TEXTSCAN_LOG_LEVEL";
const ENV_LOG_FILE: &'static str = "TEXTSCAN_LOG_FILE";
const ENV_COLOR_MODE: &'static str = "TEXTSCAN_COLOR_MODE";

const COLOR_MODE_AUTO: &'static str = "auto";
const COLOR_MODE_NONE: &'static str = "none";
const COLOR_MODE_8_COLORS: &'static str = "8";
const COLOR_MODE_256_COLORS: &'static str = "256";

const DEFAULT_LOG_FILE: &'static str = "textscan.log";

const ARG_HELP: &'static str = "--help";
const ARG_COLOR_MODE: &'static str = "--color-mode";
const ARG_LOG_LEVEL: &'static str = "--log-level";
const ARG_LOG_FILE: &'static str = "--log-file";
const ARG_ENCODING: &'static str = "--encoding";
const ARG_LINE_BREAKS: &'static str = "--line-breaks";
const ARG_JSON: &'static str = "--json";
const ARG_VERSION: &'static str = "--version";

const EXIT_CODE_OK: i32 = 0;
const EXIT_CODE_NO_FILES: i32 = 1;
const EXIT_CODE_BAD_ARGS: i32 = 2;
const EXIT_CODE_NO_RUNTIME: i32 = 3;
const EXIT_CODE_SCAN_FAILED: i32 = 4;

fn write_version<T: Terminal>(terminal: &mut T) -> std::io::Result<()> {
    trace!("Printing version...");
    terminal.write(format!("textscan - lexical summary of text files\nversion {}\n", env!("CARGO_PKG_VERSION")))?;
    terminal.flush()?;
    return Ok(());
}

fn get_default_color_mode() -> TermColorMode {
    if !atty::is(Stream::Stdout) {
        return TermColorMode::None;
    }

    // Ask tput for the number of colors, assume 8 if that does not work
    let available_colors = Command::new("tput")
        .arg("colors")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .and_then(|s| usize::from_str(s.trim()).ok())
        .unwrap_or(8);

    let auto_color_mode = if available_colors >= 256 {
        TermColorMode::C256
    } else if available_colors >= 8 {
        TermColorMode::C8
    } else {
        TermColorMode::None
    };

    return match std::env::var(ENV_COLOR_MODE).as_ref().map(|v| &v[..]) {
        Ok(COLOR_MODE_NONE) => TermColorMode::None,
        Ok(COLOR_MODE_8_COLORS) => TermColorMode::C8,
        Ok(COLOR_MODE_256_COLORS) => TermColorMode::C256,
        _ => auto_color_mode
    };
}

fn setup_logging(arg_result: &ArgResult, color_mode: TermColorMode) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if let Some(Ok(level)) = arg_result.get_argument(ARG_LOG_LEVEL).map(LevelFilter::from_str) {
        level
    } else if let Ok(Ok(level)) = std::env::var(ENV_LOG_LEVEL).map(|s| LevelFilter::from_str(&s)) {
        level
    } else {
        LevelFilter::Warn
    };

    let target = if let Some(path) = arg_result.get_argument(ARG_LOG_FILE) {
        PathBuf::from(path)
    } else if let Ok(path) = std::env::var(ENV_LOG_FILE) {
        PathBuf::from(path)
    } else {
        PathBuf::from(DEFAULT_LOG_FILE)
    };
    let file = std::fs::File::create(target)?;

    let file_logger = WriteLogger::new(log_level, Config::default(), file);
    let term_logger = TermLogger::new(
        log_level,
        ConfigBuilder::new()
            .set_time_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .build(),
        TerminalMode::Stderr,
        match color_mode {
            TermColorMode::None => ColorChoice::Never,
            _ => ColorChoice::Always
        }
    );

    CombinedLogger::init(vec![file_logger, term_logger])?;
    return Ok(());
}

/// Expands every glob pattern into the files it matches. Patterns that fail
/// to parse are logged and skipped.
fn discover_files(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        trace!("Looking for files matching {}...", pattern);
        let paths = match glob(pattern) {
            Ok(paths) => paths,
            Err(err) => {
                error!("Invalid pattern {}: {}", pattern, err);
                continue;
            }
        };
        for path in paths {
            match path {
                Ok(path) if path.is_file() => files.push(path),
                Ok(path) => debug!("Skipping {}, not a file", path.display()),
                Err(err) => error!("Error matching {}: {}", pattern, err)
            }
        }
    }
    return files;
}

/// Loads and scans every file. Files that cannot be loaded or scanned are
/// reported on the terminal and left out of the result.
async fn scan_files<T: Terminal>(
    files: &[PathBuf],
    encoding: &'static Encoding,
    line_breaks: LineBreakMode,
    terminal: &mut T
) -> std::io::Result<(Vec<FileReport>, bool)> {
    let scanner = match LineScanner::new() {
        Ok(scanner) => scanner,
        Err(err) => {
            error!("Could not build scanner: {}", err);
            return Ok((Vec::new(), false));
        }
    };

    let mut reports = Vec::with_capacity(files.len());
    let mut all_ok = true;
    for path in files {
        let result = match load_source(path, encoding).await {
            Ok(source) => scanner.scan_source(&source.with_line_breaks(line_breaks)).map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string())
        };
        match result {
            Ok(report) => reports.push(report),
            Err(msg) => {
                all_ok = false;
                terminal.set_color_fg(&TermColor::Error)?;
                terminal.write(format!("{}: {}\n", path.display(), msg))?;
                terminal.reset_color()?;
            }
        }
    }
    terminal.flush()?;
    return Ok((reports, all_ok));
}

fn usage_error(arg_template: ArgTemplate, terminal: &mut ColorTerminal, program_name: &str, msg: &str) -> ! {
    arg_template
        .set_usage_header(msg)
        .write_usage(terminal, program_name).expect("Stdout is broken!!");
    exit(EXIT_CODE_BAD_ARGS);
}

fn main() {
    let default_color_mode = get_default_color_mode();
    let mut initial_terminal = ColorTerminal::new(default_color_mode);

    let arg_template = ArgTemplate::new()
        .set_usage_header("textscan - lexical summary of text files")
        .add_argument(Arg::new(ARG_HELP, "Prints this help text").short("-h"))
        .add_argument(Arg::new(ARG_COLOR_MODE, "Selects how color is used in the output:\n- auto: auto-detect color capabilities (default)\n- none: Do not use color\n- 8:    8-color palette\n- 256:  256-color palette").short("-cm").parameter("<mode>"))
        .add_argument(Arg::new(ARG_LOG_LEVEL, "Selects the logging level. Valid values are \"error\", \"warn\", \"info\", \"debug\" and \"trace\"").short("-ll").parameter("<level>"))
        .add_argument(Arg::new(ARG_LOG_FILE, &format!("The name of the log file. Default is {}", DEFAULT_LOG_FILE)).short("-lf").parameter("<path>"))
        .add_argument(Arg::new(ARG_ENCODING, &format!("Encoding of the input files. Default is {}", DEFAULT_ENCODING_LABEL)).short("-e").parameter("<label>"))
        .add_argument(Arg::new(ARG_LINE_BREAKS, "Line terminators to recognize:\n- ascii: CRLF, LF and CR (default)\n- unicode: also VT, FF, NEL, LS and PS").short("-lb").parameter("<mode>"))
        .add_argument(Arg::new(ARG_JSON, "Prints the reports as JSON").short("-j"))
        .add_argument(Arg::new(ARG_VERSION, "Prints the program version and exits"))
        .set_usage_trailer("Every file argument may be a glob pattern.");

    let program_name = std::env::args().next().unwrap_or_else(|| String::from("textscan"));
    let arg_result = match arg_template.parse_args(std::env::args()) {
        Ok(res) => res,
        Err(ArgError(msg)) => usage_error(arg_template, &mut initial_terminal, &program_name, &msg)
    };

    let color_mode = match arg_result.get_argument(ARG_COLOR_MODE) {
        Some(COLOR_MODE_256_COLORS) => TermColorMode::C256,
        Some(COLOR_MODE_8_COLORS) => TermColorMode::C8,
        Some(COLOR_MODE_NONE) => TermColorMode::None,
        Some(COLOR_MODE_AUTO) | None => default_color_mode,
        Some(mode) => {
            let msg = format!("Unrecognized color mode: {}", mode);
            usage_error(arg_template, &mut initial_terminal, &program_name, &msg)
        }
    };

    let encoding = match encoding_for_label(arg_result.get_argument(ARG_ENCODING).unwrap_or(DEFAULT_ENCODING_LABEL)) {
        Ok(encoding) => encoding,
        Err(err) => {
            let msg = err.to_string();
            usage_error(arg_template, &mut initial_terminal, &program_name, &msg)
        }
    };

    let line_breaks = match arg_result.get_argument(ARG_LINE_BREAKS).map(LineBreakMode::from_str) {
        Some(Ok(mode)) => mode,
        Some(Err(err)) => {
            let msg = err.to_string();
            usage_error(arg_template, &mut initial_terminal, &program_name, &msg)
        },
        None => LineBreakMode::default()
    };

    let mut terminal = ColorTerminal::new(color_mode);

    if let Err(e) = setup_logging(&arg_result, color_mode) {
        terminal.set_color_fg(&TermColor::Error).expect("Stdout is broken!!");
        terminal.write(format!("Error setting up logging: {}\n", e)).expect("Stdout is broken!!");
        terminal.reset_color().expect("Stdout is broken!!");
        terminal.flush().expect("Stdout is broken!!");
    }

    if arg_result.has_argument(ARG_HELP) {
        trace!("Help requested");
        arg_template.write_usage(&mut terminal, &program_name).expect("Stdout is broken!!");
        exit(EXIT_CODE_OK);
    }

    if arg_result.has_argument(ARG_VERSION) {
        trace!("Version requested");
        write_version(&mut terminal).expect("Stdout is broken!!");
        exit(EXIT_CODE_OK);
    }

    let files = discover_files(arg_result.get_rest());
    if files.is_empty() {
        error!("No input files");
        arg_template.write_usage(&mut terminal, &program_name).expect("Stdout is broken!!");
        exit(EXIT_CODE_NO_FILES);
    }

    let tokio_runtime = match Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to initialize runtime: {}", e);
            exit(EXIT_CODE_NO_RUNTIME);
        }
    };

    let (reports, all_ok) = tokio_runtime
        .block_on(scan_files(&files, encoding, line_breaks, &mut terminal))
        .expect("Stdout is broken!!");

    if arg_result.has_argument(ARG_JSON) {
        terminal.write(format!("{}\n", reports_to_json(&reports))).expect("Stdout is broken!!");
        terminal.flush().expect("Stdout is broken!!");
    } else {
        write_reports(&reports, &mut terminal).expect("Stdout is broken!!");
    }

    exit(if all_ok { EXIT_CODE_OK } else { EXIT_CODE_SCAN_FAILED });
}
