use crate::cursor::TextCursor;
use crate::error::{SourceError, TextPosition};
use crate::line_break::LineBreakMode;

use encoding_rs::{DecoderResult, Encoding};
use log::{debug, trace};
use tokio::io::AsyncReadExt;

use std::path::Path;

pub const DEFAULT_ENCODING_LABEL: &'static str = "utf-8";

/// A fully decoded text buffer together with the name it was loaded under.
#[derive(Clone, Debug)]
pub struct Source {
    name: String,
    text: String,
    line_breaks: LineBreakMode
}

impl Source {

    pub fn new(name: &str, text: String) -> Source {
        Source {
            name: name.to_owned(),
            text,
            line_breaks: LineBreakMode::default()
        }
    }

    /// Sets the line terminator definition that cursors created by `cursor()`
    /// will use.
    pub fn with_line_breaks(mut self, line_breaks: LineBreakMode) -> Source {
        self.line_breaks = line_breaks;
        return self;
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// Creates a new cursor at the start of the text.
    pub fn cursor(&self) -> TextCursor<'_> {
        TextCursor::with_line_breaks(&self.text, self.line_breaks)
    }
}

/// Looks up an encoding by its WHATWG label, e.g. "utf-8" or "latin1".
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, SourceError> {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => Err(SourceError::UnknownEncoding(label.to_owned()))
    }
}

/// Decodes `bytes` as `encoding` without replacing malformed sequences.
///
/// A leading byte order mark is removed. If the input is malformed, the error
/// carries the offending bytes and the location in the text decoded so far.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String, SourceError> {
    let mut decoder = encoding.new_decoder_with_bom_removal();
    let mut text = String::new();
    let mut consumed = 0;

    loop {
        let remaining = bytes.len() - consumed;
        let needed = decoder.max_utf8_buffer_length_without_replacement(remaining).unwrap_or(remaining * 4);
        text.reserve(needed);

        let (result, read) = decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut text, true);
        consumed += read;

        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad_len, read_after) => {
                // The malformed sequence counts as read, as do the bytes that
                // were examined after it.
                let bad_end = consumed - read_after as usize;
                let bad_start = bad_end - bad_len as usize;
                let position = TextPosition::at(&text, text.len(), LineBreakMode::default());
                debug!("Malformed {} input at {}: {:?}", encoding.name(), position, &bytes[bad_start..bad_end]);
                return Err(SourceError::Encoding(bytes[bad_start..bad_end].to_owned(), encoding, position));
            }
        }
    }
}

/// Reads the file at `path` completely and decodes it as `encoding`.
pub async fn load_source(path: &Path, encoding: &'static Encoding) -> Result<Source, SourceError> {
    trace!("Opening file {}...", path.display());
    let mut file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).await?;

    trace!("Decoding {} bytes from {} as {}...", bytes.len(), path.display(), encoding.name());
    let text = decode(&bytes, encoding)?;
    return Ok(Source::new(&path.display().to_string(), text));
}

#[cfg(test)]
mod tests {

    use super::{decode, encoding_for_label, load_source, Source};
    use crate::error::{SourceError, TextPosition};
    use crate::line_break::LineBreakMode;

    use encoding_rs::{UTF_8, WINDOWS_1252};

    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("textcursor_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn decode_valid_utf8_strips_bom() -> () {
        let text = decode(b"\xef\xbb\xbfTest \xf0\x9f\xa7\xaa", UTF_8).unwrap();
        assert_eq!(text, "Test 🧪");
    }

    #[test]
    fn decode_other_encodings() -> () {
        let text = decode(b"caf\xe9", WINDOWS_1252).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn decode_rejects_malformed_bytes_in_the_middle() -> () {
        match decode(b"Line\nError \xff More stuff", UTF_8) {
            Err(SourceError::Encoding(bytes, encoding, position)) => {
                assert_eq!(bytes, vec![255]);
                assert_eq!(encoding, UTF_8);
                assert_eq!(position, TextPosition { line: 1, col: 6 });
            },
            other => panic!("unexpected result {:?}", other)
        }
    }

    #[test]
    fn decode_rejects_truncated_sequence_at_the_end() -> () {
        match decode(b"Error \xf0\x9f", UTF_8) {
            Err(SourceError::Encoding(bytes, _, position)) => {
                assert_eq!(bytes, vec![0xf0, 0x9f]);
                assert_eq!(position, TextPosition { line: 0, col: 6 });
            },
            other => panic!("unexpected result {:?}", other)
        }
    }

    #[test]
    fn encoding_labels() -> () {
        assert_eq!(encoding_for_label("utf-8").unwrap(), UTF_8);
        assert_eq!(encoding_for_label(" latin1 ").unwrap(), WINDOWS_1252);
        match encoding_for_label("klingon") {
            Err(SourceError::UnknownEncoding(label)) => assert_eq!(label, "klingon"),
            other => panic!("unexpected result {:?}", other)
        }
    }

    #[test]
    fn source_cursor_uses_configured_line_breaks() -> () {
        let source = Source::new("inline", "a\u{2029}b".to_owned()).with_line_breaks(LineBreakMode::Unicode);
        let mut cursor = source.cursor();
        assert_eq!(cursor.rest_of_line(false), "a");
        assert_eq!(source.get_name(), "inline");
    }

    #[tokio::test]
    async fn load_source_reads_and_decodes_file() {
        let path = temp_file("load_source_reads_and_decodes_file.txt", b"first\r\nsecond\n");
        let source = load_source(&path, UTF_8).await.unwrap();
        assert_eq!(source.get_text(), "first\r\nsecond\n");
        assert_eq!(source.get_name(), path.display().to_string());

        let mut cursor = source.cursor();
        assert_eq!(cursor.rest_of_line(true), "first\r\n");
        assert_eq!(cursor.rest_of_line(true), "second\n");
        assert!(cursor.is_eof());
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn load_source_reports_missing_files() {
        let path = PathBuf::from("/this/path/does/not/exist/textcursor.txt");
        match load_source(&path, UTF_8).await {
            Err(SourceError::IO(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected result {:?}", other)
        }
    }
}
