pub mod config;
pub mod errors;
pub mod extract;
pub mod intake;
pub mod metrics;
pub mod report;
pub mod results;
pub mod search;
pub mod terms;
pub mod upload;

pub use config::{SearchConfig, SearchMode, SearchOptions};
pub use errors::{ExtractionError, ScoutResult, SearchError};
pub use metrics::SearchMetrics;
pub use report::{Report, ReportSummary, DEFAULT_REPORT_NAME, REPORT_COLUMNS, REPORT_SHEET_NAME};
pub use results::{FileResult, SearchResult};
pub use search::{search, Progress, SearchEngine};
pub use terms::{terms_from_workbook, validate_terms, TermValidity};
pub use upload::UploadedFile;
