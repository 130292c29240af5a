/// Search result records.
///
/// A [`SearchResult`] is one row of the final report. It is created once by the
/// executor that found the match (or by the router when a file cannot be read)
/// and is never mutated afterwards; results only move, from a chunk into the
/// file's list and from there into the session's [`crate::report::Report`].
use serde::{Serialize, Serializer};

/// Location text used for a file that could not be parsed
pub const READ_ERROR_LOCATION: &str = "Error reading file";

/// One uniquely located hit: a cell, line or slide shape matched by one or more terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Name of the uploaded file
    pub file: String,
    /// Human-readable position, e.g. `"Sheet1 C4"` or `"Page 2, Line 10 of 35"`
    pub location: String,
    /// Every term that matched this unit, in term order
    #[serde(serialize_with = "join_terms")]
    pub search_terms: Vec<String>,
    /// The unit's text exactly as extracted; `None` for read-error rows
    pub original_content: Option<String>,
}

impl SearchResult {
    pub fn new(
        file: impl Into<String>,
        location: impl Into<String>,
        search_terms: Vec<String>,
        original_content: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            location: location.into(),
            search_terms,
            original_content: Some(original_content.into()),
        }
    }

    /// The single row recorded for a file whose contents could not be extracted
    pub fn read_error(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            location: READ_ERROR_LOCATION.to_string(),
            search_terms: Vec::new(),
            original_content: None,
        }
    }

    pub fn is_read_error(&self) -> bool {
        self.original_content.is_none() && self.location == READ_ERROR_LOCATION
    }

    /// Matched terms as they appear in the report: `"Dog, Up"`
    pub fn joined_terms(&self) -> String {
        self.search_terms.join(", ")
    }
}

fn join_terms<S: Serializer>(terms: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&terms.join(", "))
}

/// Everything one file contributed to a session
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Name of the uploaded file
    pub file: String,
    /// Matches in scan order, or a single read-error row
    pub results: Vec<SearchResult>,
    /// Size of the file in bytes
    pub bytes: u64,
}

impl FileResult {
    /// Whether extraction failed for this file
    pub fn failed(&self) -> bool {
        self.results.len() == 1 && self.results[0].is_read_error()
    }
}
