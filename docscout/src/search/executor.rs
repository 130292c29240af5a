use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace};

use super::matcher::PatternMatcher;
use super::unit::SearchableUnit;
use crate::errors::{ScoutResult, SearchError};
use crate::extract::{Slide, Table, TextSection};
use crate::metrics::SearchMetrics;
use crate::results::SearchResult;

/// Read-only parameters every chunk worker of one file needs.
///
/// Bound once per file and captured by reference in each chunk's closure.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub file_name: &'a str,
    pub matcher: &'a PatternMatcher,
    pub metrics: &'a SearchMetrics,
}

impl<'a> SearchContext<'a> {
    pub fn new(file_name: &'a str, matcher: &'a PatternMatcher, metrics: &'a SearchMetrics) -> Self {
        Self {
            file_name,
            matcher,
            metrics,
        }
    }

    /// Matches a unit against every term, producing at most one result
    fn scan(&self, unit: SearchableUnit<'_>, content: &str) -> Option<SearchResult> {
        let matched = self.matcher.matching_terms(content);
        if matched.is_empty() {
            return None;
        }

        trace!("{}: {} matched {:?}", self.file_name, unit, matched);
        Some(SearchResult::new(
            self.file_name,
            unit.location(),
            matched.into_iter().map(String::from).collect(),
            unit.content(),
        ))
    }
}

/// Data-parallel search over tables and line lists.
///
/// Content is split into as many contiguous chunks as the pool has workers;
/// chunks are scanned independently and their results concatenated in chunk
/// order, so output follows the table's row-major (or the document's line)
/// order. Clones share the same pool.
#[derive(Clone)]
pub struct ChunkExecutor {
    pool: Arc<ThreadPool>,
    workers: usize,
}

impl std::fmt::Debug for ChunkExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkExecutor")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ChunkExecutor {
    pub fn new(workers: NonZeroUsize) -> ScoutResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("docscout-chunk-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(format!("chunk worker pool: {}", e)))?;

        Ok(Self {
            pool: Arc::new(pool),
            workers: workers.get(),
        })
    }

    /// Number of chunks each table or line list is split into
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Searches every non-blank cell of `table`.
    ///
    /// Cells are matched on their trimmed text; the result keeps the raw value.
    /// Locations read `"{sheet} {column letter}{row + 1}"`.
    pub fn search_table(&self, ctx: &SearchContext<'_>, table: &Table) -> Vec<SearchResult> {
        if table.is_empty() {
            return Vec::new();
        }

        let chunks = split_even(table.row_count(), self.workers);
        debug!(
            "{}: searching {} rows of '{}' in {} chunks",
            ctx.file_name,
            table.row_count(),
            table.sheet_name,
            chunks.len()
        );

        let per_chunk: Vec<Vec<SearchResult>> = self.pool.install(|| {
            chunks
                .into_par_iter()
                .map(|rows| scan_rows(ctx, table, rows))
                .collect()
        });

        concat(ctx, per_chunk)
    }

    /// Searches each line of `section`.
    ///
    /// Lines are numbered from 1 before partitioning and every location reports
    /// the section's full line count: `"{context} Line {n} of {total}"`.
    pub fn search_lines(&self, ctx: &SearchContext<'_>, section: &TextSection) -> Vec<SearchResult> {
        if section.is_empty() {
            return Vec::new();
        }

        let total = section.line_count();
        let chunk_size = total.div_ceil(self.workers);
        debug!(
            "{}: searching {} lines{} in chunks of {}",
            ctx.file_name,
            total,
            if section.location_context.is_empty() {
                String::new()
            } else {
                format!(" of '{}'", section.location_context)
            },
            chunk_size
        );

        let per_chunk: Vec<Vec<SearchResult>> = self.pool.install(|| {
            section
                .lines
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(index, lines)| {
                    let first_line = index * chunk_size + 1;
                    scan_lines(ctx, &section.location_context, lines, first_line, total)
                })
                .collect()
        });

        concat(ctx, per_chunk)
    }
}

fn scan_rows(ctx: &SearchContext<'_>, table: &Table, rows: Range<usize>) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut cells = 0u64;

    for row in rows {
        for (column, value) in table.rows[row].iter().enumerate() {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            cells += 1;

            let unit = SearchableUnit::TabularCell {
                column: table.column_offset + column,
                row: table.row_offset + row,
                sheet: &table.sheet_name,
                value,
            };
            results.extend(ctx.scan(unit, trimmed));
        }
    }

    ctx.metrics.record_cells(cells);
    results
}

fn scan_lines(
    ctx: &SearchContext<'_>,
    location_prefix: &str,
    lines: &[String],
    first_line: usize,
    total_lines: usize,
) -> Vec<SearchResult> {
    let results: Vec<SearchResult> = lines
        .iter()
        .enumerate()
        .filter_map(|(offset, text)| {
            let unit = SearchableUnit::DocumentLine {
                line_number: first_line + offset,
                total_lines,
                location_prefix,
                text,
            };
            ctx.scan(unit, text.strip_suffix('\r').unwrap_or(text))
        })
        .collect();

    ctx.metrics.record_lines(lines.len() as u64);
    results
}

fn concat(ctx: &SearchContext<'_>, per_chunk: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    let results: Vec<SearchResult> = per_chunk.into_iter().flatten().collect();
    ctx.metrics.record_results(results.len() as u64);
    results
}

/// Searches slides in a single pass on the calling thread.
///
/// Each shape's text is one unit located as `"Slide {n}"`.
pub fn search_slides(ctx: &SearchContext<'_>, slides: &[Slide]) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for slide in slides {
        for text in &slide.shapes {
            let unit = SearchableUnit::SlideShape {
                slide_number: slide.number,
                text,
            };
            results.extend(ctx.scan(unit, text));
        }
    }
    ctx.metrics.record_results(results.len() as u64);
    results
}

/// Splits `0..len` into at most `parts` contiguous ranges whose lengths differ
/// by at most one, longer ranges first. Empty ranges are omitted.
pub fn split_even(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let base = len / parts;
    let extra = len % parts;

    let mut ranges = Vec::with_capacity(parts.min(len));
    let mut start = 0;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        if size == 0 {
            break;
        }
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOptions;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn executor(workers: usize) -> ChunkExecutor {
        ChunkExecutor::new(NonZeroUsize::new(workers).unwrap()).unwrap()
    }

    #[test]
    fn test_split_even() {
        assert_eq!(split_even(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
        assert_eq!(split_even(2, 4), vec![0..1, 1..2]);
        assert_eq!(split_even(0, 4), Vec::<Range<usize>>::new());
        assert_eq!(split_even(5, 1), vec![0..5]);
    }

    #[test]
    fn test_tabular_search_combines_terms_per_cell() {
        let table = Table::new(
            "",
            vec![
                strings(&["Pineapple", "Mango", "Cranberry"]),
                strings(&["What's up Dog?", "Cat", "Elephant"]),
            ],
        );
        let matcher = PatternMatcher::new(
            &strings(&["Cranberry", "Dog", "Up"]),
            SearchOptions::literal(false, false),
        )
        .unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("test.csv", &matcher, &metrics);

        let results = executor(4).search_table(&ctx, &table);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].location, " C1");
        assert_eq!(results[0].joined_terms(), "Cranberry");
        assert_eq!(results[1].location, " A2");
        assert_eq!(results[1].joined_terms(), "Dog, Up");
        assert_eq!(
            results[1].original_content.as_deref(),
            Some("What's up Dog?")
        );
        assert_eq!(metrics.snapshot().cells_scanned, 6);
    }

    #[test]
    fn test_tabular_search_uses_sheet_name_and_origin() {
        let table = Table::new("Budget", vec![strings(&["", "  total  "])]).with_origin(4, 1);
        let matcher =
            PatternMatcher::new(&strings(&["total"]), SearchOptions::literal(false, true)).unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("book.xlsx", &matcher, &metrics);

        let results = executor(2).search_table(&ctx, &table);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location, "Budget C5");
        // Raw cell text is kept
        assert_eq!(results[0].original_content.as_deref(), Some("  total  "));
    }

    #[test]
    fn test_tabular_search_skips_blank_cells() {
        let table = Table::new("", vec![strings(&["   ", "", "x"])]);
        let matcher = PatternMatcher::new(&strings(&["^$"]), SearchOptions::regex()).unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("blank.csv", &matcher, &metrics);

        assert!(executor(4).search_table(&ctx, &table).is_empty());
        assert_eq!(metrics.snapshot().cells_scanned, 1);
    }

    #[test]
    fn test_tabular_order_is_row_major() {
        let rows: Vec<Vec<String>> = (0..25)
            .map(|r| vec![format!("hit {}", r), format!("hit {}b", r)])
            .collect();
        let table = Table::new("S", rows);
        let matcher =
            PatternMatcher::new(&strings(&["hit"]), SearchOptions::literal(false, false)).unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("many.xlsx", &matcher, &metrics);

        let results = executor(4).search_table(&ctx, &table);

        assert_eq!(results.len(), 50);
        assert_eq!(results[0].location, "S A1");
        assert_eq!(results[1].location, "S B1");
        assert_eq!(results[49].location, "S B25");
    }

    #[test]
    fn test_document_search_line_numbering() {
        let section = TextSection::new(
            "",
            strings(&[
                "This is a test line",
                "Another line to search",
                "Final test line",
            ]),
        );
        let matcher = PatternMatcher::new(
            &strings(&["test", "search"]),
            SearchOptions::literal(false, false),
        )
        .unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("notes.txt", &matcher, &metrics);

        let results = executor(4).search_lines(&ctx, &section);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].location, " Line 1 of 3");
        assert_eq!(results[0].joined_terms(), "test");
        assert_eq!(results[1].location, " Line 2 of 3");
        assert_eq!(results[1].joined_terms(), "search");
        assert_eq!(results[2].location, " Line 3 of 3");
        assert_eq!(metrics.snapshot().lines_scanned, 3);
    }

    #[test]
    fn test_document_total_is_the_full_count() {
        let lines: Vec<String> = (1..=10).map(|i| format!("line {}", i)).collect();
        let section = TextSection::new("Page 2,", lines);
        let matcher =
            PatternMatcher::new(&strings(&["line 7"]), SearchOptions::literal(false, false))
                .unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("report.pdf", &matcher, &metrics);

        let results = executor(3).search_lines(&ctx, &section);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location, "Page 2, Line 7 of 10");
    }

    #[test]
    fn test_crlf_lines_match_without_carriage_return() {
        let section = TextSection::from_text("", "the hour\r\nlate hour\r\n");
        let matcher = PatternMatcher::new(&strings(&["hour$"]), SearchOptions::regex()).unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("dos.txt", &matcher, &metrics);

        let results = executor(2).search_lines(&ctx, &section);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].location, " Line 1 of 3");
        assert_eq!(results[0].original_content.as_deref(), Some("the hour\r"));
        assert_eq!(results[1].original_content.as_deref(), Some("late hour\r"));
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let matcher =
            PatternMatcher::new(&strings(&["x"]), SearchOptions::literal(false, false)).unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("empty", &matcher, &metrics);
        let executor = executor(4);

        assert!(executor.search_table(&ctx, &Table::default()).is_empty());
        assert!(executor
            .search_lines(&ctx, &TextSection::default())
            .is_empty());

        let stats = metrics.snapshot();
        assert_eq!(stats.cells_scanned, 0);
        assert_eq!(stats.lines_scanned, 0);
    }

    #[test]
    fn test_slide_search() {
        let slides = vec![
            Slide {
                number: 1,
                shapes: strings(&["Quarterly Review", "Agenda"]),
            },
            Slide {
                number: 2,
                shapes: strings(&["Review the agenda"]),
            },
        ];
        let matcher = PatternMatcher::new(
            &strings(&["agenda", "review"]),
            SearchOptions::literal(false, true),
        )
        .unwrap();
        let metrics = SearchMetrics::new();
        let ctx = SearchContext::new("deck.pptx", &matcher, &metrics);

        let results = search_slides(&ctx, &slides);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].location, "Slide 1");
        assert_eq!(results[0].joined_terms(), "review");
        assert_eq!(results[1].joined_terms(), "agenda");
        assert_eq!(results[2].location, "Slide 2");
        assert_eq!(results[2].joined_terms(), "agenda, review");
    }
}
