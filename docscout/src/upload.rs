use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::errors::ScoutResult;

/// A file handed to the search engine: a display name and its full contents.
///
/// The bytes sit behind an `Arc`, so cloning is cheap and every reader sees
/// the whole buffer from the start; there is no shared read position.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, naming it after its final path component
    pub fn from_path(path: &Path) -> ScoutResult<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased text after the last `.` in the name, if any
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// Lower-cased single-suffix extension of a file name
pub(crate) fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_last_suffix() {
        assert_eq!(extension_of("Report.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("data.backup.csv").as_deref(), Some("csv"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_clones_share_bytes() {
        let file = UploadedFile::new("notes.txt", b"hello".to_vec());
        let copy = file.clone();
        assert_eq!(copy.bytes(), b"hello");
        assert_eq!(file.bytes(), copy.bytes());
        assert_eq!(file.len(), 5);
        assert_eq!(file.extension().as_deref(), Some("txt"));
    }
}
