use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::io::{Cursor, Read, Seek};
use tracing::debug;

use super::{ExtractResult, Table};
use crate::upload::UploadedFile;

/// Reads every sheet of an `.xlsx` workbook, in workbook order
pub fn extract_xlsx(file: &UploadedFile) -> ExtractResult<Vec<Table>> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(file.bytes())).map_err(calamine::Error::from)?;
    read_sheets(file.name(), workbook)
}

/// Reads every sheet of a legacy `.xls` workbook, in workbook order
pub fn extract_xls(file: &UploadedFile) -> ExtractResult<Vec<Table>> {
    let workbook: Xls<_> = Xls::new(Cursor::new(file.bytes())).map_err(calamine::Error::from)?;
    read_sheets(file.name(), workbook)
}

fn read_sheets<RS, R>(file_name: &str, mut workbook: R) -> ExtractResult<Vec<Table>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    let sheet_names = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(calamine::Error::from)?;
        debug!(
            "{}: sheet '{}' spans {:?}",
            file_name,
            sheet_name,
            range.get_size()
        );
        tables.push(range_to_table(sheet_name, &range));
    }

    Ok(tables)
}

/// Converts a used range into a table anchored at the range's absolute origin
pub(crate) fn range_to_table(sheet_name: String, range: &Range<Data>) -> Table {
    let (row, column) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect();

    Table::new(sheet_name, rows).with_origin(row, column)
}

/// Display text of a cell; integral floats lose their fractional part
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}

/// Builds an `.xlsx` workbook in memory; each sheet lists `(row, column, text)` cells
#[cfg(test)]
pub(crate) fn xlsx_fixture(sheets: &[(&str, &[(u32, u16, &str)])]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for (name, cells) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for &(row, column, text) in cells.iter() {
            sheet.write_string(row, column, text).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}
