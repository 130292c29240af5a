/// Format extractors.
///
/// Each extractor reads one [`UploadedFile`] fully from memory and produces owned,
/// immutable content in one of three shapes:
///
/// - [`Table`]: rows of cell strings, one per CSV file or workbook sheet
/// - [`TextSection`]: numbered lines sharing a location prefix, one per text
///   file, Word document or PDF page
/// - [`Slide`]: shape texts of one presentation slide
///
/// The executors borrow [`crate::search::SearchableUnit`] views out of these
/// values while scanning. Parse failures come back as [`ExtractionError`] and are
/// turned into a read-error row by the router.
pub mod delimited;
pub mod docx;
pub mod encoding;
pub mod pdf;
pub mod pptx;
pub mod spreadsheet;
pub mod text;

use crate::errors::ExtractionError;
use crate::upload::UploadedFile;

pub type ExtractResult<T> = Result<T, ExtractionError>;

/// A rectangular-ish grid of cell text; rows may differ in length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Workbook sheet name, empty for CSV
    pub sheet_name: String,
    pub rows: Vec<Vec<String>>,
    /// Absolute zero-based row of `rows[0]`
    pub row_offset: usize,
    /// Absolute zero-based column of each row's first cell
    pub column_offset: usize,
}

impl Table {
    pub fn new(sheet_name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows,
            row_offset: 0,
            column_offset: 0,
        }
    }

    /// Places the grid's first cell at `(row, column)` in the sheet
    pub fn with_origin(mut self, row: usize, column: usize) -> Self {
        self.row_offset = row;
        self.column_offset = column;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Lines of text searched under one location prefix, e.g. `"Page 3,"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSection {
    pub location_context: String,
    pub lines: Vec<String>,
}

impl TextSection {
    pub fn new(location_context: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            location_context: location_context.into(),
            lines,
        }
    }

    /// Splits `text` on `\n`. Lines are kept verbatim, so CRLF text keeps its
    /// `\r`; the line search ignores it when matching.
    ///
    /// Empty text still yields one empty line, and a trailing newline yields a
    /// final empty line, so line totals match what an editor shows.
    pub fn from_text(location_context: impl Into<String>, text: &str) -> Self {
        let lines = text.split('\n').map(String::from).collect();
        Self::new(location_context, lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Text of every text-bearing shape on one slide, in shape order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    /// One-based slide number
    pub number: usize,
    pub shapes: Vec<String>,
}

/// Signature shared by the table-producing extractors
pub type TableExtractor = fn(&UploadedFile) -> ExtractResult<Vec<Table>>;

/// Signature shared by the line-producing extractors
pub type DocumentExtractor = fn(&UploadedFile) -> ExtractResult<Vec<TextSection>>;

/// Signature of the slide extractor
pub type SlideExtractor = fn(&UploadedFile) -> ExtractResult<Vec<Slide>>;
