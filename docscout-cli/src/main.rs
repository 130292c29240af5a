use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use docscout::{
    intake::collect_uploads,
    search::FormatRegistry,
    terms_from_workbook, validate_terms, Report, SearchConfig, SearchEngine, SearchMode,
    SearchOptions, TermValidity, UploadedFile, DEFAULT_REPORT_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Files or directories to search
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Search term (can be specified multiple times)
    #[arg(short = 't', long = "term")]
    terms: Vec<String>,

    /// Read search terms from the first column of an .xls or .xlsx workbook
    #[arg(short = 'f', long)]
    terms_file: Option<PathBuf>,

    /// Treat every term as a regular expression
    #[arg(short = 'r', long)]
    regex: bool,

    /// Match case exactly (literal terms only)
    #[arg(short = 'c', long)]
    case_sensitive: bool,

    /// Match whole words only (literal terms only)
    #[arg(short = 'w', long)]
    whole_word: bool,

    /// Where to write the report (.xlsx, .csv or .json)
    #[arg(short, long, default_value = DEFAULT_REPORT_NAME)]
    output: PathBuf,

    /// Do not write a report file
    #[arg(long)]
    no_export: bool,

    /// Patterns to ignore when walking directories (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Maximum number of files searched at once
    #[arg(long)]
    file_workers: Option<NonZeroUsize>,

    /// Number of chunks each table or document is split into
    #[arg(short = 'j', long)]
    chunk_workers: Option<NonZeroUsize>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search documents for terms and export the matches
    Search(Box<CliSearchConfig>),

    /// Check which regex terms compile
    CheckPatterns {
        /// Patterns to check (can be specified multiple times)
        #[arg(short = 't', long = "term")]
        terms: Vec<String>,

        /// Read patterns from the first column of an .xls or .xlsx workbook
        #[arg(short = 'f', long)]
        terms_file: Option<PathBuf>,
    },

    /// List the file extensions that can be searched
    Formats,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => run_search(*args),
        Commands::CheckPatterns { terms, terms_file } => {
            let terms = gather_terms(terms, terms_file.as_ref())?;
            if terms.is_empty() {
                bail!("No patterns given; use --term or --terms-file");
            }
            let checks = validate_terms(&terms, &SearchOptions::regex());
            print_validity_table(&checks);
            Ok(())
        }
        Commands::Formats => {
            for extension in FormatRegistry::builtin().extensions() {
                println!(".{}", extension);
            }
            Ok(())
        }
    }
}

fn run_search(args: CliSearchConfig) -> Result<()> {
    let file_config = SearchConfig::load_from(args.config.as_deref())
        .context("Failed to load configuration")?;

    let defaults = SearchConfig::default();
    let cli_config = SearchConfig {
        terms: gather_terms(args.terms, args.terms_file.as_ref())?,
        mode: if args.regex {
            SearchMode::Regex
        } else {
            SearchMode::Literal
        },
        case_sensitive: args.case_sensitive,
        whole_word: args.whole_word,
        file_workers: args.file_workers.unwrap_or(defaults.file_workers),
        chunk_workers: args.chunk_workers.unwrap_or(defaults.chunk_workers),
        ignore_patterns: args.ignore,
        log_level: args.log_level.unwrap_or(defaults.log_level),
    };
    let config = file_config.merge_with_cli(cli_config);

    init_logging(&config.log_level);

    if config.terms.is_empty() {
        bail!("No search terms given; use --term, --terms-file or a config file");
    }

    let engine = SearchEngine::new(&config)?;
    let files = collect_uploads(&args.paths, &config.ignore_patterns, engine.registry())?;
    debug!(
        "Searching {} files for {} terms with {:?}",
        files.len(),
        config.terms.len(),
        config.options()
    );

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    let report = engine.search_with_progress(&files, &config.terms, |p| {
        progress.set_position(p.completed as u64);
    })?;
    progress.finish_and_clear();

    if !report.invalid_terms().is_empty() {
        print_validity_table(report.invalid_terms());
    }
    print_search_results(&report, args.stats);

    if args.stats {
        let stats = engine.metrics().snapshot();
        println!(
            "Scanned {} cells and {} lines across {} files ({} bytes)",
            stats.cells_scanned, stats.lines_scanned, stats.files_completed, stats.bytes_read
        );
    }

    if !args.no_export {
        report
            .save(&args.output)
            .with_context(|| format!("Failed to write report to {}", args.output.display()))?;
        println!("Report written to {}", args.output.display());
    }

    Ok(())
}

/// Terms typed on the command line followed by any read from a workbook
fn gather_terms(mut terms: Vec<String>, terms_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(path) = terms_file {
        let workbook = UploadedFile::from_path(path)?;
        terms.extend(terms_from_workbook(&workbook)?);
    }
    Ok(terms)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore a second initialization
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_validity_table(checks: &[TermValidity]) {
    let width = checks
        .iter()
        .map(|c| c.term.chars().count())
        .max()
        .unwrap_or(0)
        .max("Pattern".len());

    println!("{:<width$}  {}", "Pattern".bold(), "Status".bold(), width = width);
    for check in checks {
        let status = if check.valid {
            "valid".green()
        } else {
            "invalid".red()
        };
        match &check.reason {
            Some(reason) => println!(
                "{:<width$}  {}: {}",
                check.term,
                status,
                reason.lines().last().unwrap_or_default(),
                width = width
            ),
            None => println!("{:<width$}  {}", check.term, status, width = width),
        }
    }
}

fn print_search_results(report: &Report, stats_only: bool) {
    let summary = report.summary();

    if !stats_only {
        for (file, rows) in &report.rows().iter().group_by(|r| r.file.as_str()) {
            println!("\n{}", file.blue());
            for row in rows {
                if row.is_read_error() {
                    println!("  {}", row.location.red());
                    continue;
                }
                println!(
                    "  {} [{}] {}",
                    row.location.trim_start().green(),
                    row.joined_terms().yellow(),
                    row.original_content.as_deref().unwrap_or_default()
                );
            }
        }
        println!();
    }

    for (file, count) in report
        .matches_per_file()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
    {
        println!("{:>6}  {}", count, file);
    }

    println!(
        "Found {} matches in {} files ({} searched, {} unreadable)",
        summary.matched_rows, summary.files_with_matches, summary.files_searched, summary.files_failed
    );
}
