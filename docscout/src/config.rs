use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default cap on files searched at once. File tasks mostly wait on parsing,
/// so this is larger than the per-file chunk parallelism.
pub const DEFAULT_FILE_WORKERS: usize = 50;

/// Lower bound for the per-file chunk worker count
pub const MIN_CHUNK_WORKERS: usize = 4;

/// How search terms are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Substring or whole-word comparison
    #[default]
    Literal,
    /// Terms are regular expressions
    Regex,
}

/// Immutable matching policy for one search session.
///
/// `case_sensitive` and `whole_word` only apply in [`SearchMode::Literal`];
/// a regex term carries its own flags (`(?i)`, `\b`) inside the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl SearchOptions {
    /// Literal search with the given flags
    pub fn literal(case_sensitive: bool, whole_word: bool) -> Self {
        Self {
            mode: SearchMode::Literal,
            case_sensitive,
            whole_word,
        }
    }

    /// Regex search; the literal-only flags are cleared
    pub fn regex() -> Self {
        Self {
            mode: SearchMode::Regex,
            case_sensitive: false,
            whole_word: false,
        }
    }

    pub fn is_regex(&self) -> bool {
        self.mode == SearchMode::Regex
    }
}

/// Configuration for a search session.
///
/// # Configuration Locations
///
/// Loaded from, in increasing order of precedence:
/// 1. Global `$HOME/.config/docscout/config.yaml`
/// 2. Local `.docscout.yaml` in the current directory
/// 3. A file passed with `--config`
///
/// Command-line values are merged on top with [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// terms: ["invoice", "overdue"]
/// mode: literal          # literal | regex
/// case_sensitive: false
/// whole_word: true
/// file_workers: 50
/// chunk_workers: 8
/// ignore_patterns:
///   - "**/archive/**"
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Literal phrases or regex sources, depending on `mode`
    #[serde(default)]
    pub terms: Vec<String>,

    #[serde(default)]
    pub mode: SearchMode,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub whole_word: bool,

    /// Maximum number of files searched concurrently
    #[serde(default = "default_file_workers")]
    pub file_workers: NonZeroUsize,

    /// Number of chunks (and workers) each table or document is split into
    #[serde(default = "default_chunk_workers")]
    pub chunk_workers: NonZeroUsize,

    /// Glob patterns for files to skip when expanding directories
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_file_workers() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_FILE_WORKERS).unwrap_or(NonZeroUsize::MIN)
}

fn default_chunk_workers() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().max(MIN_CHUNK_WORKERS)).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            mode: SearchMode::default(),
            case_sensitive: false,
            whole_word: false,
            file_workers: default_file_workers(),
            chunk_workers: default_chunk_workers(),
            ignore_patterns: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file layered over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("docscout/config.yaml")),
            Some(PathBuf::from(".docscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit path must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        if !cli_config.terms.is_empty() {
            self.terms = cli_config.terms;
        }
        if cli_config.mode != SearchMode::Literal {
            self.mode = cli_config.mode;
        }
        if cli_config.case_sensitive {
            self.case_sensitive = true;
        }
        if cli_config.whole_word {
            self.whole_word = true;
        }
        if cli_config.file_workers != default_file_workers() {
            self.file_workers = cli_config.file_workers;
        }
        if cli_config.chunk_workers != default_chunk_workers() {
            self.chunk_workers = cli_config.chunk_workers;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// The immutable matching policy handed to the orchestrator
    pub fn options(&self) -> SearchOptions {
        match self.mode {
            SearchMode::Literal => SearchOptions::literal(self.case_sensitive, self.whole_word),
            SearchMode::Regex => SearchOptions::regex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            terms: ["\\d{3}-\\d{4}", "invoice"]
            mode: regex
            file_workers: 10
            chunk_workers: 6
            ignore_patterns: ["**/old/*"]
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.terms, vec![r"\d{3}-\d{4}", "invoice"]);
        assert_eq!(config.mode, SearchMode::Regex);
        assert_eq!(config.file_workers, NonZeroUsize::new(10).unwrap());
        assert_eq!(config.chunk_workers, NonZeroUsize::new(6).unwrap());
        assert_eq!(config.ignore_patterns, vec!["**/old/*".to_string()]);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let config_content = r#"
            terms: ["hour"]
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.terms, vec!["hour"]);
        assert_eq!(config.mode, SearchMode::Literal);
        assert!(!config.case_sensitive);
        assert!(!config.whole_word);
        assert_eq!(config.file_workers.get(), DEFAULT_FILE_WORKERS);
        assert!(config.chunk_workers.get() >= MIN_CHUNK_WORKERS);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            mode: fuzzy
            file_workers: "lots"
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = SearchConfig {
            terms: vec!["draft".to_string()],
            whole_word: true,
            ignore_patterns: vec!["**/tmp/*".to_string()],
            file_workers: NonZeroUsize::new(8).unwrap(),
            ..SearchConfig::default()
        };

        let cli_config = SearchConfig {
            terms: vec!["final".to_string()],
            case_sensitive: true,
            log_level: "debug".to_string(),
            ..SearchConfig::default()
        };

        let merged = config_file.merge_with_cli(cli_config);
        assert_eq!(merged.terms, vec!["final"]); // CLI value
        assert!(merged.case_sensitive); // CLI value
        assert!(merged.whole_word); // File value kept
        assert_eq!(merged.file_workers, NonZeroUsize::new(8).unwrap()); // File value (CLI default)
        assert_eq!(merged.ignore_patterns, vec!["**/tmp/*".to_string()]);
        assert_eq!(merged.log_level, "debug");
    }

    #[test]
    fn test_regex_options_clear_literal_flags() {
        let config = SearchConfig {
            mode: SearchMode::Regex,
            case_sensitive: true,
            whole_word: true,
            ..SearchConfig::default()
        };
        let options = config.options();
        assert!(options.is_regex());
        assert!(!options.case_sensitive);
        assert!(!options.whole_word);
    }
}
