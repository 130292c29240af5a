use std::fmt;

/// The atomic piece of extracted content a term is matched against.
///
/// Units borrow from the extractor's output and exist only while a chunk is
/// being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchableUnit<'a> {
    /// A spreadsheet or CSV cell; `row` and `column` are zero-based
    TabularCell {
        column: usize,
        row: usize,
        sheet: &'a str,
        value: &'a str,
    },
    /// One line of a document; `line_number` is one-based
    DocumentLine {
        line_number: usize,
        total_lines: usize,
        location_prefix: &'a str,
        text: &'a str,
    },
    /// The text of one shape on a slide; `slide_number` is one-based
    SlideShape { slide_number: usize, text: &'a str },
}

impl<'a> SearchableUnit<'a> {
    /// Raw text of the unit
    pub fn content(&self) -> &'a str {
        match *self {
            SearchableUnit::TabularCell { value, .. } => value,
            SearchableUnit::DocumentLine { text, .. } => text,
            SearchableUnit::SlideShape { text, .. } => text,
        }
    }

    /// Location text shown in the report
    pub fn location(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SearchableUnit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SearchableUnit::TabularCell {
                column, row, sheet, ..
            } => write!(f, "{} {}{}", sheet, column_letter(column), row + 1),
            SearchableUnit::DocumentLine {
                line_number,
                total_lines,
                location_prefix,
                ..
            } => write!(
                f,
                "{} Line {} of {}",
                location_prefix, line_number, total_lines
            ),
            SearchableUnit::SlideShape { slide_number, .. } => write!(f, "Slide {}", slide_number),
        }
    }
}

/// Spreadsheet column name for a zero-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
///
/// Bijective base-26, so there is no zero digit.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    // Only ASCII uppercase bytes were pushed
    letters.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
        assert_eq!(column_letter(16383), "XFD");
    }

    #[test]
    fn test_cell_location() {
        let unit = SearchableUnit::TabularCell {
            column: 2,
            row: 3,
            sheet: "Sheet1",
            value: "x",
        };
        assert_eq!(unit.location(), "Sheet1 C4");
        assert_eq!(unit.content(), "x");

        let csv_cell = SearchableUnit::TabularCell {
            column: 0,
            row: 0,
            sheet: "",
            value: "y",
        };
        assert_eq!(csv_cell.location(), " A1");
    }

    #[test]
    fn test_line_location() {
        let unit = SearchableUnit::DocumentLine {
            line_number: 10,
            total_lines: 35,
            location_prefix: "Page 2,",
            text: "hello",
        };
        assert_eq!(unit.location(), "Page 2, Line 10 of 35");

        let plain = SearchableUnit::DocumentLine {
            line_number: 1,
            total_lines: 3,
            location_prefix: "",
            text: "hello",
        };
        assert_eq!(plain.location(), " Line 1 of 3");
    }

    #[test]
    fn test_slide_location() {
        let unit = SearchableUnit::SlideShape {
            slide_number: 4,
            text: "Agenda",
        };
        assert_eq!(unit.location(), "Slide 4");
        assert_eq!(unit.content(), "Agenda");
    }
}
