use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::info;

use crate::errors::{ScoutResult, SearchError};
use crate::results::{FileResult, SearchResult};
use crate::terms::TermValidity;
use crate::upload::extension_of;

/// File name the report is saved under when none is given
pub const DEFAULT_REPORT_NAME: &str = "Multi_File_Search_Results.xlsx";

/// Worksheet the xlsx report is written to
pub const REPORT_SHEET_NAME: &str = "Search Results";

/// Column headers of the exported report
pub const REPORT_COLUMNS: [&str; 4] = ["file", "location", "search_terms", "original_content"];

/// The outcome of a search session: one row per result, in completion order,
/// plus the terms that were rejected before searching began.
#[derive(Debug, Clone, Default)]
pub struct Report {
    rows: Vec<SearchResult>,
    invalid_terms: Vec<TermValidity>,
    files_searched: usize,
    files_failed: usize,
}

/// Headline counts for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    pub rows: usize,
    pub matched_rows: usize,
    pub error_rows: usize,
    pub files_searched: usize,
    pub files_with_matches: usize,
    pub files_failed: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invalid_terms(invalid_terms: Vec<TermValidity>) -> Self {
        Self {
            invalid_terms,
            ..Self::default()
        }
    }

    /// Appends one finished file's rows
    pub fn add_file_result(&mut self, file_result: FileResult) {
        self.files_searched += 1;
        if file_result.failed() {
            self.files_failed += 1;
        }
        self.rows.extend(file_result.results);
    }

    pub fn rows(&self) -> &[SearchResult] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SearchResult> {
        self.rows
    }

    /// Regex terms that were excluded from matching
    pub fn invalid_terms(&self) -> &[TermValidity] {
        &self.invalid_terms
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let error_rows = self.rows.iter().filter(|r| r.is_read_error()).count();
        let files_with_matches = self.matches_per_file().len();

        ReportSummary {
            rows: self.rows.len(),
            matched_rows: self.rows.len() - error_rows,
            error_rows,
            files_searched: self.files_searched,
            files_with_matches,
            files_failed: self.files_failed,
        }
    }

    /// Matched rows per file, in order of each file's first row
    pub fn matches_per_file(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for row in self.rows.iter().filter(|r| !r.is_read_error()) {
            match counts.iter_mut().find(|(file, _)| *file == row.file) {
                Some((_, count)) => *count += 1,
                None => counts.push((row.file.as_str(), 1)),
            }
        }
        counts
    }

    /// Writes the rows as CSV with a single header row.
    ///
    /// Read-error rows leave `search_terms` and `original_content` empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> ScoutResult<()> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(REPORT_COLUMNS)?;
        for row in &self.rows {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes the rows to a single-sheet workbook with a bold header row.
    ///
    /// Read-error rows leave `search_terms` and `original_content` blank.
    pub fn write_xlsx<W: Write + Seek + Send>(&self, writer: W) -> ScoutResult<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(REPORT_SHEET_NAME)?;

        for (col, name) in (0u16..).zip(REPORT_COLUMNS) {
            sheet.write_string_with_format(0, col, name, &header)?;
        }
        for (row, result) in (1u32..).zip(&self.rows) {
            sheet.write_string(row, 0, &result.file)?;
            sheet.write_string(row, 1, &result.location)?;
            if result.is_read_error() {
                continue;
            }
            sheet.write_string(row, 2, result.joined_terms())?;
            if let Some(content) = &result.original_content {
                sheet.write_string(row, 3, content)?;
            }
        }

        workbook.save_to_writer(writer)?;
        Ok(())
    }

    /// Writes the rows as a JSON array of objects keyed by column name
    pub fn write_json<W: Write>(&self, writer: W) -> ScoutResult<()> {
        serde_json::to_writer_pretty(writer, &self.rows)?;
        Ok(())
    }

    /// Saves the report, choosing the format from the extension of `path`:
    /// `.xlsx`, `.csv` or `.json`
    pub fn save(&self, path: &Path) -> ScoutResult<()> {
        let extension = path
            .file_name()
            .and_then(|n| extension_of(&n.to_string_lossy()));

        match extension.as_deref() {
            Some("xlsx") => {
                let file = File::create(path)?;
                self.write_xlsx(BufWriter::new(file))?;
            }
            Some("csv") => {
                let file = File::create(path)?;
                self.write_csv(BufWriter::new(file))?;
            }
            Some("json") => {
                let mut writer = BufWriter::new(File::create(path)?);
                self.write_json(&mut writer)?;
                writer.flush()?;
            }
            _ => return Err(SearchError::unsupported_file_type(path)),
        }

        info!("Wrote {} report rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}
