use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{SearchMode, SearchOptions};
use crate::errors::{ScoutResult, SearchError};
use crate::metrics::SearchMetrics;

const MAX_CACHED_PATTERNS: usize = 256; // Distinct regex sources kept before the cache is emptied

/// Compiled regexes shared across sessions
static PATTERN_CACHE: Lazy<PatternCache> = Lazy::new(|| PatternCache::new(MAX_CACHED_PATTERNS));

/// Decides whether `term` matches `content` under `options`.
///
/// In regex mode the term is a pattern searched anywhere in the content and the
/// literal flags are ignored. In literal mode both sides are lower-cased unless
/// the search is case-sensitive; a whole-word search then compares the term
/// against each word token of the content, otherwise it is a substring test.
/// A term containing a space can never equal a single token, so multi-word
/// terms never match in whole-word mode.
///
/// Callers validate regex terms first; an invalid pattern that slips through
/// matches nothing.
pub fn matches(content: &str, term: &str, options: &SearchOptions) -> bool {
    match options.mode {
        SearchMode::Regex => match compile_cached(term, None) {
            Ok(regex) => regex.is_match(content),
            Err(e) => {
                warn!("Skipping invalid pattern '{}': {}", term, e);
                false
            }
        },
        SearchMode::Literal if options.case_sensitive => {
            literal_match(content, term, options.whole_word)
        }
        SearchMode::Literal => literal_match(
            &content.to_lowercase(),
            &term.to_lowercase(),
            options.whole_word,
        ),
    }
}

fn literal_match(content: &str, term: &str, whole_word: bool) -> bool {
    if whole_word {
        word_tokens(content).any(|token| token == term)
    } else {
        content.contains(term)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Maximal runs of alphanumeric or underscore characters
pub fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
}

/// Checks that a regex term compiles, returning the parser's message if not
pub fn validate_pattern(pattern: &str) -> Result<(), String> {
    compile_cached(pattern, None)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn compile_cached(
    pattern: &str,
    metrics: Option<&SearchMetrics>,
) -> Result<Arc<Regex>, regex::Error> {
    PATTERN_CACHE.get_or_compile(pattern, metrics)
}

/// Compiled regexes keyed by their source.
///
/// Holds at most `capacity` entries; inserting into a full cache empties it
/// first.
struct PatternCache {
    entries: DashMap<String, Arc<Regex>>,
    capacity: usize,
}

impl PatternCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn get_or_compile(
        &self,
        pattern: &str,
        metrics: Option<&SearchMetrics>,
    ) -> Result<Arc<Regex>, regex::Error> {
        if let Some(entry) = self.entries.get(pattern) {
            if let Some(metrics) = metrics {
                metrics.record_cache_lookup(true);
            }
            return Ok(entry.clone());
        }

        let regex = Arc::new(Regex::new(pattern)?);
        if let Some(metrics) = metrics {
            metrics.record_cache_lookup(false);
        }
        if self.len() >= self.capacity {
            debug!("Pattern cache full ({} entries), clearing", self.len());
            self.entries.clear();
        }
        self.entries.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Strategy for matching a single term
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Substring test against the (possibly lower-cased) content
    Substring(String),
    /// Exact comparison against each word token
    WholeWord(String),
    Regex(Arc<Regex>),
}

impl MatchStrategy {
    fn is_match(&self, content: &str) -> bool {
        match self {
            MatchStrategy::Substring(needle) => content.contains(needle.as_str()),
            MatchStrategy::WholeWord(word) => word_tokens(content).any(|token| token == word),
            MatchStrategy::Regex(regex) => regex.is_match(content),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledTerm {
    term: String,
    strategy: MatchStrategy,
}

/// The full term list of a session, compiled once and shared read-only by
/// every chunk worker.
///
/// For any content, [`PatternMatcher::matching_terms`] returns exactly the terms
/// for which [`matches`] is true, in term order.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    terms: Vec<CompiledTerm>,
    fold_case: bool,
}

impl PatternMatcher {
    /// Compiles `terms` under `options`
    pub fn new(terms: &[String], options: SearchOptions) -> ScoutResult<Self> {
        Self::build(terms, options, None)
    }

    /// Compiles `terms`, recording regex cache lookups in `metrics`
    pub fn with_metrics(
        terms: &[String],
        options: SearchOptions,
        metrics: &SearchMetrics,
    ) -> ScoutResult<Self> {
        Self::build(terms, options, Some(metrics))
    }

    fn build(
        terms: &[String],
        options: SearchOptions,
        metrics: Option<&SearchMetrics>,
    ) -> ScoutResult<Self> {
        let fold_case = !options.is_regex() && !options.case_sensitive;
        let mut compiled = Vec::with_capacity(terms.len());

        for term in terms {
            let strategy = match options.mode {
                SearchMode::Regex => MatchStrategy::Regex(
                    compile_cached(term, metrics)
                        .map_err(|e| SearchError::invalid_pattern(term.as_str(), e.to_string()))?,
                ),
                SearchMode::Literal => {
                    let needle = if fold_case {
                        term.to_lowercase()
                    } else {
                        term.clone()
                    };
                    if options.whole_word {
                        MatchStrategy::WholeWord(needle)
                    } else {
                        MatchStrategy::Substring(needle)
                    }
                }
            };
            compiled.push(CompiledTerm {
                term: term.clone(),
                strategy,
            });
        }

        debug!(
            "Compiled {} terms (mode: {:?}, fold case: {})",
            compiled.len(),
            options.mode,
            fold_case
        );

        Ok(Self {
            terms: compiled,
            fold_case,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// The original terms, in order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.term.as_str())
    }

    /// Every term that matches `content`, in term order
    pub fn matching_terms(&self, content: &str) -> Vec<&str> {
        let folded;
        let haystack = if self.fold_case {
            folded = content.to_lowercase();
            folded.as_str()
        } else {
            content
        };

        self.terms
            .iter()
            .filter(|t| t.strategy.is_match(haystack))
            .map(|t| t.term.as_str())
            .collect()
    }
}
