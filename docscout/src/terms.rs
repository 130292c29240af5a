/// Search term preparation.
///
/// Terms arrive as typed phrases, regex sources, or the first column of an
/// uploaded workbook. Before a session starts they are normalized (literal mode)
/// or validated (regex mode); patterns that do not compile are reported back
/// and never reach the matcher.
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{SearchMode, SearchOptions};
use crate::errors::{ScoutResult, SearchError};
use crate::extract::{spreadsheet, Table};
use crate::search::matcher::validate_pattern;
use crate::upload::UploadedFile;

/// Whether one term can be used, with the compiler's reason if not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermValidity {
    pub term: String,
    pub valid: bool,
    pub reason: Option<String>,
}

impl TermValidity {
    fn valid(term: &str) -> Self {
        Self {
            term: term.to_string(),
            valid: true,
            reason: None,
        }
    }

    fn invalid(term: &str, reason: String) -> Self {
        Self {
            term: term.to_string(),
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Terms split into those the matcher will use and those it will not
#[derive(Debug, Clone, Default)]
pub struct PreparedTerms {
    pub usable: Vec<String>,
    pub rejected: Vec<TermValidity>,
}

/// Checks every term, in input order.
///
/// Literal terms are always valid. Regex terms are valid when they compile.
pub fn validate_terms(terms: &[String], options: &SearchOptions) -> Vec<TermValidity> {
    terms
        .iter()
        .map(|term| match options.mode {
            SearchMode::Literal => TermValidity::valid(term),
            SearchMode::Regex => match validate_pattern(term) {
                Ok(()) => TermValidity::valid(term),
                Err(reason) => TermValidity::invalid(term, reason),
            },
        })
        .collect()
}

/// Trims literal terms and drops the ones left empty
pub fn normalize_literal_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Produces the term list a session searches with.
///
/// Literal terms are normalized. Regex terms are kept verbatim, minus any that
/// fail to compile, which are returned in `rejected`.
pub fn prepare_terms(terms: &[String], options: &SearchOptions) -> PreparedTerms {
    match options.mode {
        SearchMode::Literal => PreparedTerms {
            usable: normalize_literal_terms(terms),
            rejected: Vec::new(),
        },
        SearchMode::Regex => {
            let mut prepared = PreparedTerms::default();
            for check in validate_terms(terms, options) {
                if check.valid {
                    prepared.usable.push(check.term);
                } else {
                    warn!(
                        "Ignoring invalid pattern '{}': {}",
                        check.term,
                        check.reason.as_deref().unwrap_or("unknown error")
                    );
                    prepared.rejected.push(check);
                }
            }
            prepared
        }
    }
}

/// Reads search terms from the first column of the first sheet of a workbook.
///
/// No header row is assumed. Values are trimmed and blank cells dropped.
pub fn terms_from_workbook(file: &UploadedFile) -> ScoutResult<Vec<String>> {
    let tables = match file.extension().as_deref() {
        Some("xlsx") => spreadsheet::extract_xlsx(file),
        Some("xls") => spreadsheet::extract_xls(file),
        _ => {
            return Err(SearchError::term_file(
                file.name(),
                "expected an .xls or .xlsx workbook",
            ))
        }
    }
    .map_err(|e| SearchError::term_file(file.name(), e.to_string()))?;

    let first = tables
        .first()
        .ok_or_else(|| SearchError::term_file(file.name(), "workbook has no sheets"))?;

    let terms = first_column_terms(first);
    debug!("Read {} search terms from {}", terms.len(), file.name());
    Ok(terms)
}

fn first_column_terms(table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .filter_map(|row| row.first())
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}
