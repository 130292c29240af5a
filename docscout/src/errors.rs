/// Error types for docscout.
///
/// Two layers of failure are kept apart:
///
/// 1. [`SearchError`] covers everything that can stop a search session before it
///    starts or after it ends: bad configuration, an upload with an extension no
///    extractor is registered for, an unreadable search-term workbook, or a report
///    that cannot be written.
/// 2. [`ExtractionError`] covers a single uploaded file that could not be parsed.
///    It never leaves the per-file boundary; the router turns it into one
///    "Error reading file" row and the rest of the session carries on.
///
/// ```rust,ignore
/// match extract(&file) {
///     Ok(units) => search(units),
///     Err(e) => vec![SearchResult::read_error(file.name())],
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search session operations
pub type ScoutResult<T> = Result<T, SearchError>;

/// Errors that can occur around a search session
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
    #[error("Could not read search terms from {name}: {reason}")]
    TermFile { name: String, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Workbook error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

impl SearchError {
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn unsupported_file_type(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFileType(path.into())
    }

    pub fn term_file(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TermFile {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single uploaded file could not be turned into searchable units
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("could not decode text as {encoding}")]
    Decode { encoding: &'static str },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable workbook: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("unreadable Word document: {0}")]
    Docx(String),
    #[error("unreadable PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("corrupt archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("malformed XML in {part}: {reason}")]
    Xml { part: String, reason: String },
    #[error("missing document part: {0}")]
    MissingPart(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    pub fn docx(reason: impl std::fmt::Display) -> Self {
        Self::Docx(reason.to_string())
    }

    pub fn xml(part: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Xml {
            part: part.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing_part(part: impl Into<String>) -> Self {
        Self::MissingPart(part.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SearchError::invalid_pattern("[a-", "unclosed character class");
        assert!(matches!(err, SearchError::InvalidPattern { .. }));

        let err = SearchError::unsupported_file_type("notes.md");
        assert!(matches!(err, SearchError::UnsupportedFileType(_)));

        let err = SearchError::term_file("terms.xlsx", "no sheets");
        assert!(matches!(err, SearchError::TermFile { .. }));

        let err = ExtractionError::missing_part("word/document.xml");
        assert!(matches!(err, ExtractionError::MissingPart(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::invalid_pattern("(abc", "unclosed group");
        assert_eq!(err.to_string(), "Invalid pattern '(abc': unclosed group");

        let err = SearchError::config_error("file_workers must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: file_workers must be at least 1"
        );

        let err = SearchError::unsupported_file_type("notes.md");
        assert_eq!(err.to_string(), "Unsupported file type: notes.md");

        let err = ExtractionError::xml("ppt/slides/slide1.xml", "unexpected end");
        assert_eq!(
            err.to_string(),
            "malformed XML in ppt/slides/slide1.xml: unexpected end"
        );

        let err = ExtractionError::Decode { encoding: "Big5" };
        assert_eq!(err.to_string(), "could not decode text as Big5");
    }
}
