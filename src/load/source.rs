//! Where settings documents come from and how they are parsed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::DocumentError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Syntax of a settings document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }

    /// Parses raw document bytes into a document tree.
    ///
    /// A leading UTF-8 byte order mark is skipped. TOML tables are converted
    /// into the same tree JSON produces, so the loader sees one node model
    /// regardless of the syntax.
    pub fn parse(self, bytes: &[u8]) -> Result<Value, DocumentError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match self {
            DocumentFormat::Json => Ok(serde_json::from_slice(bytes)?),
            DocumentFormat::Toml => {
                let text = std::str::from_utf8(bytes)?;
                let table: toml::Table = toml::from_str(text)?;
                Ok(serde_json::to_value(table)?)
            }
        }
    }
}

/// A backing store for a settings document.
pub trait DocumentSource: fmt::Debug {
    /// Human-readable location, used in errors.
    fn origin(&self) -> String;

    fn format(&self) -> DocumentFormat;

    /// Reads the raw document bytes. Decoding is left to the parser.
    fn open(&self) -> std::io::Result<Vec<u8>>;
}

/// A settings document on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: DocumentFormat,
}

impl FileSource {
    /// Creates a file source, inferring the format from the extension.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn open(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// A settings document held in memory.
#[derive(Debug, Clone)]
pub struct TextSource<'a> {
    text: &'a str,
    format: DocumentFormat,
}

impl<'a> TextSource<'a> {
    pub fn new(text: &'a str, format: DocumentFormat) -> Self {
        Self { text, format }
    }
}

impl DocumentSource for TextSource<'_> {
    fn origin(&self) -> String {
        "<memory>".to_string()
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn open(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.text.as_bytes().to_vec())
    }
}

/// In-memory JSON text.
impl DocumentSource for &str {
    fn origin(&self) -> String {
        "<memory>".to_string()
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn open(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/settings.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("settings.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("settings.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("settings")), DocumentFormat::Json);
    }

    #[test]
    fn test_file_source_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"key": "value"}}"#).unwrap();

        let source = FileSource::new(file.path());
        let text = source.open().unwrap();

        assert_eq!(source.format().parse(&text).unwrap(), json!({"key": "value"}));
        assert_eq!(source.path(), file.path());
    }

    #[test]
    fn test_file_source_missing() {
        let source = FileSource::new("/nonexistent/path/settings.json");
        let err = source.open().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_toml_parses_into_json_tree() {
        let value = DocumentFormat::Toml
            .parse(b"Count = -3\nRatio = 0.5\nNames = [\"a\", \"b\"]\n\n[Window]\nwidth = 800\n")
            .unwrap();

        assert_eq!(
            value,
            json!({
                "Count": -3,
                "Ratio": 0.5,
                "Names": ["a", "b"],
                "Window": {"width": 800}
            })
        );
    }

    #[test]
    fn test_parse_errors_keep_parser_message() {
        let err = DocumentFormat::Json.parse(b"{\"a\": ").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
        assert!(err.to_string().contains("line 1"));

        let err = DocumentFormat::Toml.parse(b"a = = 1").unwrap_err();
        assert!(matches!(err, DocumentError::Toml(_)));
    }

    #[test]
    fn test_text_sources() {
        let source = TextSource::new("x = true", DocumentFormat::Toml);
        assert_eq!(source.origin(), "<memory>");
        assert_eq!(source.format().parse(&source.open().unwrap()).unwrap(), json!({"x": true}));

        let source = r#"{"x": true}"#;
        assert_eq!(source.format(), DocumentFormat::Json);
    }

    #[test]
    fn test_leading_bom_is_skipped() {
        let json = DocumentFormat::Json.parse(b"\xEF\xBB\xBF{\"Count\": 9}").unwrap();
        assert_eq!(json, json!({"Count": 9}));

        let toml = DocumentFormat::Toml.parse(b"\xEF\xBB\xBFCount = 9").unwrap();
        assert_eq!(toml, json!({"Count": 9}));
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let err = DocumentFormat::Json.parse(b"{\"Count\": \"\xff\xfe\"}").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));

        let err = DocumentFormat::Toml.parse(b"Count = \"\xff\xfe\"").unwrap_err();
        assert!(matches!(err, DocumentError::Utf8(_)));
    }

    #[test]
    fn test_file_source_returns_raw_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xff\xfe").unwrap();

        let bytes = FileSource::new(file.path()).open().unwrap();
        assert_eq!(bytes, b"\xff\xfe");
    }
}
