use super::{encoding, ExtractResult, TextSection};
use crate::upload::UploadedFile;

/// Decodes a plain text upload into a single section of lines
pub fn extract(file: &UploadedFile) -> ExtractResult<Vec<TextSection>> {
    let text = encoding::decode(file.bytes())?;
    Ok(vec![TextSection::from_text("", &text)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_split() {
        let file = UploadedFile::new("notes.txt", b"alpha\r\nbeta\ngamma".to_vec());
        let sections = extract(&file).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].location_context, "");
        assert_eq!(sections[0].lines, vec!["alpha\r", "beta", "gamma"]);
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "one\ntwo".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let sections = extract(&UploadedFile::new("wide.txt", bytes)).unwrap();
        assert_eq!(sections[0].lines, vec!["one", "two"]);
    }

    #[test]
    fn test_malformed_utf16_fails() {
        // BOM followed by an unpaired high surrogate
        let bytes = vec![0xFF, 0xFE, 0x00, 0xD8];
        assert!(extract(&UploadedFile::new("broken.txt", bytes)).is_err());
    }
}
