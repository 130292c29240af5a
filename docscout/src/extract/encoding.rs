use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

use super::ExtractResult;
use crate::errors::ExtractionError;

/// Guesses the character encoding of raw text bytes.
///
/// A byte order mark wins; otherwise the statistical detector looks at the whole
/// buffer. Only a borrowed slice is read, so the caller's bytes stay untouched
/// for the decode that follows.
pub fn detect(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Detects the encoding of `bytes` and decodes them strictly.
///
/// Malformed sequences for the detected encoding are an error rather than being
/// replaced.
pub fn decode(bytes: &[u8]) -> ExtractResult<String> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, bom_len),
        None => (detect(bytes), 0),
    };
    debug!("Decoding {} bytes as {}", bytes.len(), encoding.name());

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .ok_or(ExtractionError::Decode {
            encoding: encoding.name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_text() {
        let text = "Welcome, 欢迎, bienvenue";
        assert_eq!(detect(text.as_bytes()), encoding_rs::UTF_8);
        assert_eq!(decode(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_bom_is_honored_and_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("héllo".as_bytes());
        assert_eq!(decode(&bytes).unwrap(), "héllo");

        // UTF-16LE "hi"
        let utf16 = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(detect(&utf16), encoding_rs::UTF_16LE);
        assert_eq!(decode(&utf16).unwrap(), "hi");
    }

    #[test]
    fn test_legacy_single_byte_text() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(
            "Le café était fermé, mais la crème brûlée de la boulangerie à côté était déjà prête.",
        );
        let text = decode(&bytes).unwrap();
        assert!(text.contains("café"));
        assert!(text.starts_with("Le caf"));
    }

    #[test]
    fn test_plain_ascii() {
        assert_eq!(decode(b"plain ascii\nsecond line").unwrap(), "plain ascii\nsecond line");
    }
}
