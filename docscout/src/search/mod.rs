/// The search pipeline, from one upload to the session report.
///
/// ```text
/// SearchEngine ──(file pool, one task per upload)──▶ Router
///     Router ──▶ extractor ──▶ ChunkExecutor (chunk pool) ──▶ PatternMatcher
///     Router ──▶ pptx extractor ──▶ search_slides (single pass)
/// ```
///
/// Both pools are plain rayon thread pools. Chunk workers share only read-only
/// state: the compiled terms, the file name and the sheet or page context,
/// bound once per file in a [`SearchContext`].
///
/// ```rust,ignore
/// let engine = SearchEngine::new(&config)?;
/// let report = engine.search_with_progress(&uploads, &config.terms, |p| {
///     println!("{:.0}%", p.fraction() * 100.0);
/// })?;
/// ```
pub mod engine;
pub mod executor;
pub mod matcher;
pub mod router;
pub mod unit;

pub use engine::{search, Progress, SearchEngine};
pub use executor::{search_slides, ChunkExecutor, SearchContext};
pub use matcher::{matches, MatchStrategy, PatternMatcher};
pub use router::{Extractor, FormatRegistry, Router};
pub use unit::{column_letter, SearchableUnit};
