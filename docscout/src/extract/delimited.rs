use csv::ReaderBuilder;
use tracing::debug;

use super::{encoding, ExtractResult, Table};
use crate::upload::UploadedFile;

/// Parses a CSV upload into one untyped table.
///
/// The first record is data, not a header, and records may have differing
/// field counts. Cells keep their text exactly as written after unquoting.
pub fn extract(file: &UploadedFile) -> ExtractResult<Vec<Table>> {
    let text = encoding::decode(file.bytes())?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

    debug!("{}: parsed {} CSV records", file.name(), rows.len());
    Ok(vec![Table::new("", rows)])
}
