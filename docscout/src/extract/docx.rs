use docx_rs::{
    read_docx, DocumentChild, Footer, FooterChild, Header, HeaderChild, InsertChild, MoveToChild,
    Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag, StructuredDataTagChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use tracing::debug;

use super::{ExtractResult, TextSection};
use crate::errors::ExtractionError;
use crate::upload::UploadedFile;

/// Extracts the text of a Word document as one section.
///
/// Header paragraphs come first, then the body, then footer paragraphs. Every
/// paragraph becomes a line, including paragraphs inside tables and content
/// controls; explicit line breaks within a paragraph start a new line. Tracked
/// insertions count as text, tracked deletions do not.
pub fn extract(file: &UploadedFile) -> ExtractResult<Vec<TextSection>> {
    let docx = read_docx(file.bytes()).map_err(ExtractionError::docx)?;
    let section = &docx.document.section_property;

    let mut paragraphs = Vec::new();
    for (_, header) in [&section.header, &section.first_header, &section.even_header]
        .into_iter()
        .flatten()
    {
        header_text(header, &mut paragraphs);
    }

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => paragraphs.push(paragraph_text(para)),
            DocumentChild::Table(table) => table_text(table, &mut paragraphs),
            DocumentChild::StructuredDataTag(tag) => tag_text(tag, &mut paragraphs),
            _ => {}
        }
    }

    for (_, footer) in [&section.footer, &section.first_footer, &section.even_footer]
        .into_iter()
        .flatten()
    {
        footer_text(footer, &mut paragraphs);
    }

    debug!("{}: {} paragraphs", file.name(), paragraphs.len());
    Ok(vec![TextSection::from_text("", &paragraphs.join("\n"))])
}

fn header_text(header: &Header, paragraphs: &mut Vec<String>) {
    for child in &header.children {
        match child {
            HeaderChild::Paragraph(para) => paragraphs.push(paragraph_text(para)),
            HeaderChild::Table(table) => table_text(table, paragraphs),
            HeaderChild::StructuredDataTag(tag) => tag_text(tag, paragraphs),
        }
    }
}

fn footer_text(footer: &Footer, paragraphs: &mut Vec<String>) {
    for child in &footer.children {
        match child {
            FooterChild::Paragraph(para) => paragraphs.push(paragraph_text(para)),
            FooterChild::Table(table) => table_text(table, paragraphs),
            FooterChild::StructuredDataTag(tag) => tag_text(tag, paragraphs),
        }
    }
}

/// Block-level content control: its paragraphs and tables are body text
fn tag_text(tag: &StructuredDataTag, paragraphs: &mut Vec<String>) {
    let mut loose = String::new();
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Paragraph(para) => paragraphs.push(paragraph_text(para)),
            StructuredDataTagChild::Table(table) => table_text(table, paragraphs),
            StructuredDataTagChild::StructuredDataTag(inner) => tag_text(inner, paragraphs),
            StructuredDataTagChild::Run(run) => push_run(run, &mut loose),
            _ => {}
        }
    }
    if !loose.is_empty() {
        paragraphs.push(loose);
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&para.children, &mut text);
    text
}

fn push_run(run: &Run, out: &mut String) {
    for piece in &run.children {
        match piece {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn push_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Insert(insert) => {
                for piece in &insert.children {
                    if let InsertChild::Run(run) = piece {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::MoveTo(moved) => {
                for piece in &moved.children {
                    if let MoveToChild::Run(run) = piece {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, out),
            ParagraphChild::StructuredDataTag(tag) => {
                for piece in &tag.children {
                    match piece {
                        StructuredDataTagChild::Run(run) => push_run(run, out),
                        StructuredDataTagChild::Paragraph(para) => {
                            push_children(&para.children, out)
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

#[allow(irrefutable_let_patterns)]
fn table_text(table: &Table, paragraphs: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else {
            continue;
        };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(para) => paragraphs.push(paragraph_text(para)),
                    TableCellContent::Table(nested) => table_text(nested, paragraphs),
                    TableCellContent::StructuredDataTag(tag) => tag_text(tag, paragraphs),
                    _ => {}
                }
            }
        }
    }
}
