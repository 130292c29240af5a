use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::executor::{search_slides, ChunkExecutor, SearchContext};
use super::matcher::PatternMatcher;
use crate::extract::{
    delimited, docx, pdf, pptx, spreadsheet, text, DocumentExtractor, SlideExtractor,
    TableExtractor,
};
use crate::metrics::SearchMetrics;
use crate::results::{FileResult, SearchResult};
use crate::upload::UploadedFile;

/// An extractor together with the executor shape its output feeds
#[derive(Debug, Clone, Copy)]
pub enum Extractor {
    /// Cells searched by [`ChunkExecutor::search_table`]
    Tabular(TableExtractor),
    /// Lines searched by [`ChunkExecutor::search_lines`]
    Document(DocumentExtractor),
    /// Shapes searched in one pass by [`search_slides`]
    Slides(SlideExtractor),
}

/// Extension-keyed table of extractors.
///
/// Keys are lower-case single suffixes without the dot.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    entries: BTreeMap<String, Extractor>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The formats docscout reads out of the box
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register("csv", Extractor::Tabular(delimited::extract))
            .register("xls", Extractor::Tabular(spreadsheet::extract_xls))
            .register("xlsx", Extractor::Tabular(spreadsheet::extract_xlsx))
            .register("docx", Extractor::Document(docx::extract))
            .register("pdf", Extractor::Document(pdf::extract))
            .register("pptx", Extractor::Slides(pptx::extract))
            .register("txt", Extractor::Document(text::extract));
        registry
    }

    /// Registers (or replaces) the extractor for `extension`
    pub fn register(&mut self, extension: &str, extractor: Extractor) -> &mut Self {
        self.entries.insert(extension.to_lowercase(), extractor);
        self
    }

    pub fn get(&self, extension: &str) -> Option<Extractor> {
        self.entries.get(extension).copied()
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.entries.contains_key(&extension.to_lowercase())
    }

    /// Registered extensions in sorted order
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Dispatches each upload to its extractor and executor.
///
/// Extraction failures stay inside [`Router::route`]: the file contributes a
/// single read-error row and nothing else.
#[derive(Debug, Clone)]
pub struct Router {
    registry: FormatRegistry,
    executor: ChunkExecutor,
}

impl Router {
    pub fn new(registry: FormatRegistry, executor: ChunkExecutor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Searches one file.
    ///
    /// # Panics
    ///
    /// If no extractor is registered for the file's extension. Uploads are
    /// filtered against the registry before they get here, so reaching this is
    /// a bug in the caller.
    pub fn route(
        &self,
        file: &UploadedFile,
        matcher: &PatternMatcher,
        metrics: &SearchMetrics,
    ) -> Vec<SearchResult> {
        let extension = file.extension().unwrap_or_default();
        let Some(extractor) = self.registry.get(&extension) else {
            panic!(
                "no extractor registered for extension '{}' of '{}'; uploads must be checked against the format registry first",
                extension,
                file.name()
            );
        };

        debug!("Routing {} ({} bytes) as .{}", file.name(), file.len(), extension);
        let ctx = SearchContext::new(file.name(), matcher, metrics);

        let outcome = match extractor {
            Extractor::Tabular(extract) => extract(file).map(|tables| {
                tables
                    .iter()
                    .flat_map(|table| self.executor.search_table(&ctx, table))
                    .collect()
            }),
            Extractor::Document(extract) => extract(file).map(|sections| {
                sections
                    .iter()
                    .flat_map(|section| self.executor.search_lines(&ctx, section))
                    .collect()
            }),
            Extractor::Slides(extract) => extract(file).map(|slides| search_slides(&ctx, &slides)),
        };

        match outcome {
            Ok(results) => results,
            Err(e) => {
                warn!("Error reading {}: {}", file.name(), e);
                vec![SearchResult::read_error(file.name())]
            }
        }
    }

    /// Searches one file, keeping its name and size alongside the rows
    pub fn route_file(
        &self,
        file: &UploadedFile,
        matcher: &PatternMatcher,
        metrics: &SearchMetrics,
    ) -> FileResult {
        let results = self.route(file, matcher, metrics);
        FileResult {
            file: file.name().to_string(),
            results,
            bytes: file.len() as u64,
        }
    }
}
