use lopdf::Document;
use tracing::debug;

use super::{ExtractResult, TextSection};
use crate::upload::UploadedFile;

/// Extracts text page by page, in page-number order.
///
/// Each page is its own section with the prefix `"Page {n},"`, so line numbers
/// restart on every page.
pub fn extract(file: &UploadedFile) -> ExtractResult<Vec<TextSection>> {
    let doc = Document::load_mem(file.bytes())?;
    let pages = doc.get_pages();
    debug!("{}: {} pages", file.name(), pages.len());

    let mut sections = Vec::with_capacity(pages.len());
    for (index, page_number) in pages.keys().enumerate() {
        let text = doc.extract_text(&[*page_number])?;
        sections.push(TextSection::from_text(
            format!("Page {},", index + 1),
            text.trim_end_matches(['\r', '\n']),
        ));
    }

    Ok(sections)
}
