/// Upload intake: turns paths given on the command line into [`UploadedFile`]s.
///
/// This is the boundary that guarantees the router only sees extensions it has
/// an extractor for. A file named explicitly with an unsupported extension is an
/// error; unsupported files found while walking a directory are skipped.
use glob::Pattern;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ScoutResult, SearchError};
use crate::search::FormatRegistry;
use crate::upload::{extension_of, UploadedFile};

/// Checks if a path matches any of the glob ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let normalized_path = path.to_string_lossy().replace('\\', "/");

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&normalized_path),
        Err(e) => {
            debug!("Skipping malformed ignore pattern '{}': {}", pattern, e);
            false
        }
    })
}

/// Checks if the file's extension has a registered extractor
pub fn has_supported_extension(path: &Path, registry: &FormatRegistry) -> bool {
    path.file_name()
        .and_then(|name| extension_of(&name.to_string_lossy()))
        .is_some_and(|ext| registry.supports(&ext))
}

/// Reads every searchable file under `paths` into memory.
///
/// Directories are walked recursively in file-name order, honoring `.gitignore`
/// files and skipping hidden entries. Explicit files keep the order given.
pub fn collect_uploads(
    paths: &[PathBuf],
    ignore_patterns: &[String],
    registry: &FormatRegistry,
) -> ScoutResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for found in walk_directory(path, ignore_patterns, registry) {
                files.push(UploadedFile::from_path(&found)?);
            }
        } else {
            if !has_supported_extension(path, registry) {
                return Err(SearchError::unsupported_file_type(path));
            }
            if should_ignore(path, ignore_patterns) {
                debug!("Ignoring {}", path.display());
                continue;
            }
            files.push(UploadedFile::from_path(path)?);
        }
    }

    debug!("Collected {} uploads", files.len());
    Ok(files)
}

fn walk_directory(root: &Path, ignore_patterns: &[String], registry: &FormatRegistry) -> Vec<PathBuf> {
    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(true)
        .ignore(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_name(|a, b| a.cmp(b));

    walker
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            if should_ignore(path, ignore_patterns) {
                debug!("Ignoring {}", path.display());
                return false;
            }
            if !has_supported_extension(path, registry) {
                debug!("Skipping unsupported file {}", path.display());
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_should_ignore() {
        let patterns = vec!["**/archive/**".to_string(), "*.bak.csv".to_string()];
        assert!(should_ignore(Path::new("data/archive/old.csv"), &patterns));
        assert!(should_ignore(Path::new("report.bak.csv"), &patterns));
        assert!(!should_ignore(Path::new("data/current.csv"), &patterns));
        assert!(!should_ignore(Path::new("data/current.csv"), &["[".to_string()]));
    }

    #[test]
    fn test_has_supported_extension() {
        let registry = FormatRegistry::builtin();
        assert!(has_supported_extension(Path::new("a/Report.PDF"), &registry));
        assert!(has_supported_extension(Path::new("deck.pptx"), &registry));
        assert!(!has_supported_extension(Path::new("notes.md"), &registry));
        assert!(!has_supported_extension(Path::new("Makefile"), &registry));
        assert!(!has_supported_extension(Path::new("bundle.tar.gz"), &registry));
    }

    #[test]
    fn test_collect_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::write(dir.path().join("a.csv"), "alpha").unwrap();
        fs::write(dir.path().join("skip.md"), "markdown").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive/old.txt"), "old").unwrap();

        let files = collect_uploads(
            &[dir.path().to_path_buf()],
            &["**/archive/**".to_string()],
            &FormatRegistry::builtin(),
        )
        .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.csv", "b.txt"]);
        assert_eq!(files[0].bytes(), b"alpha");
    }

    #[test]
    fn test_explicit_unsupported_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "text").unwrap();

        let result = collect_uploads(&[path], &[], &FormatRegistry::builtin());
        assert!(matches!(result, Err(SearchError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = collect_uploads(
            &[PathBuf::from("does/not/exist.txt")],
            &[],
            &FormatRegistry::builtin(),
        );
        assert!(matches!(result, Err(SearchError::IoError(_))));
    }
}
