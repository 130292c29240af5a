use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use super::executor::ChunkExecutor;
use super::matcher::PatternMatcher;
use super::router::{FormatRegistry, Router};
use crate::config::{SearchConfig, SearchOptions};
use crate::errors::{ScoutResult, SearchError};
use crate::metrics::SearchMetrics;
use crate::report::Report;
use crate::results::FileResult;
use crate::terms::prepare_terms;
use crate::upload::UploadedFile;

/// Files finished so far out of the session's total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in `0.0..=1.0`; an empty session counts as done
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Runs search sessions over many uploads at once.
///
/// Files are searched concurrently on a pool of `file_workers` threads, and
/// each file's tables or lines are split across a separate pool of
/// `chunk_workers` threads. Finished files are collected on the calling thread,
/// which is the only writer of the report and the only caller of the progress
/// callback.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    router: Router,
    file_pool: Arc<ThreadPool>,
    options: SearchOptions,
    metrics: SearchMetrics,
}

impl SearchEngine {
    /// Builds an engine for the built-in formats
    pub fn new(config: &SearchConfig) -> ScoutResult<Self> {
        Self::with_registry(config, FormatRegistry::builtin())
    }

    pub fn with_registry(config: &SearchConfig, registry: FormatRegistry) -> ScoutResult<Self> {
        let executor = ChunkExecutor::new(config.chunk_workers)?;
        let file_pool = ThreadPoolBuilder::new()
            .num_threads(config.file_workers.get())
            .thread_name(|i| format!("docscout-file-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(format!("file worker pool: {}", e)))?;

        debug!(
            "Search engine ready ({} file workers, {} chunk workers)",
            config.file_workers,
            executor.workers()
        );

        Ok(Self {
            router: Router::new(registry, executor),
            file_pool: Arc::new(file_pool),
            options: config.options(),
            metrics: SearchMetrics::new(),
        })
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn registry(&self) -> &FormatRegistry {
        self.router.registry()
    }

    /// Counters accumulated over every session run by this engine
    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Searches `files` for `terms` and assembles the report
    pub fn search(&self, files: &[UploadedFile], terms: &[String]) -> ScoutResult<Report> {
        self.search_with_progress(files, terms, |_| {})
    }

    /// Like [`SearchEngine::search`], reporting progress after every finished file.
    ///
    /// Invalid regex terms are left out of matching and listed in
    /// [`Report::invalid_terms`]. A file that cannot be parsed contributes one
    /// read-error row. Rows are appended in file completion order; within one
    /// file they follow the file's own scan order.
    ///
    /// Returns [`SearchError::UnsupportedFileType`] before searching anything if
    /// any upload has an extension with no registered extractor.
    pub fn search_with_progress<F>(
        &self,
        files: &[UploadedFile],
        terms: &[String],
        mut on_progress: F,
    ) -> ScoutResult<Report>
    where
        F: FnMut(Progress),
    {
        if let Some(unsupported) = files.iter().find(|f| {
            !f.extension()
                .is_some_and(|ext| self.router.registry().supports(&ext))
        }) {
            return Err(SearchError::unsupported_file_type(unsupported.name()));
        }

        let prepared = prepare_terms(terms, &self.options);
        let matcher = PatternMatcher::with_metrics(&prepared.usable, self.options, &self.metrics)?;
        let mut report = Report::with_invalid_terms(prepared.rejected);

        let total = files.len();
        info!(
            "Searching {} files for {} terms ({:?} mode)",
            total,
            matcher.len(),
            self.options.mode
        );
        let start = Instant::now();

        let (tx, rx) = mpsc::channel::<FileResult>();
        let router = &self.router;
        let metrics = &self.metrics;
        let matcher = &matcher;

        thread::scope(|scope| {
            scope.spawn(move || {
                self.file_pool.scope(|pool| {
                    for file in files {
                        let tx = tx.clone();
                        pool.spawn(move |_| {
                            let result = router.route_file(file, matcher, metrics);
                            // The receiver outlives every sender
                            let _ = tx.send(result);
                        });
                    }
                });
            });

            let mut completed = 0;
            for file_result in rx {
                metrics.record_file_completed(file_result.bytes, file_result.failed());
                completed += 1;
                debug!(
                    "Finished {} ({} rows, {}/{})",
                    file_result.file,
                    file_result.results.len(),
                    completed,
                    total
                );
                report.add_file_result(file_result);
                on_progress(Progress { completed, total });
            }
        });

        let summary = report.summary();
        info!(
            "Search complete in {}. {} results in {} of {} files ({} unreadable)",
            humantime::format_duration(start.elapsed()),
            summary.matched_rows,
            summary.files_with_matches,
            summary.files_searched,
            summary.files_failed
        );

        Ok(report)
    }
}

/// Searches `files` with default worker counts
pub fn search(
    files: &[UploadedFile],
    terms: &[String],
    options: SearchOptions,
) -> ScoutResult<Report> {
    let config = SearchConfig {
        mode: options.mode,
        case_sensitive: options.case_sensitive,
        whole_word: options.whole_word,
        ..SearchConfig::default()
    };
    SearchEngine::new(&config)?.search(files, terms)
}
