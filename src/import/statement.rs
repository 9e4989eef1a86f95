//! Statement-of-account reader.
//!
//! CSV statements have optional preamble rows, one header row naming the
//! columns, then one row per transfer. The column map in the import settings
//! says which header holds which transfer field. XML statements are handed
//! to [`super::xml`].

use std::fs;
use std::path::Path;

use super::xml::parse_xml;
use crate::config::{ColumnMap, ImportSettings};
use crate::error::ImportError;

/// One money transfer from a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub book_date: String,
    pub val_date: String,
    pub debitor: String,
    pub creditor: String,
    pub amount: String,
    pub currency: String,
    /// Free-text purpose lines.
    pub subject: Vec<String>,
}

/// Parsed CSV with its header row split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read every transfer from the statement at `path`, in file order. The
/// format follows the extension: `.csv` or `.xml`.
pub fn read_statement(
    path: &Path,
    settings: &ImportSettings,
) -> Result<Vec<Transfer>, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => {
            let columns = settings
                .columns
                .as_ref()
                .ok_or(ImportError::MissingSetting("main.columns"))?;
            let text = fs::read_to_string(path)?;
            let table = parse_csv(&text, settings.csv_delimiter, settings.csv_offset)?;
            transfers_from_table(&table, columns, &settings.currency)
        }
        Some("xml") => {
            let text = fs::read_to_string(path)?;
            parse_xml(strip_bom(&text), &settings.xml, &settings.currency)
        }
        _ => Err(ImportError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Spreadsheet exports often start with a UTF-8 byte order mark.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Parse CSV text after skipping `skip_lines` physical lines. Fields may be
/// double-quoted; quoted fields may contain the delimiter, newlines, and
/// `""` escapes. Blank lines are ignored.
pub fn parse_csv(
    text: &str,
    delimiter: char,
    skip_lines: usize,
) -> Result<CsvTable, ImportError> {
    let text = strip_bom(text);
    let body = match skip_lines.checked_sub(1) {
        None => text,
        Some(last) => text
            .match_indices('\n')
            .nth(last)
            .map_or("", |(i, _)| &text[i + 1..]),
    };

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = skip_lines + 1;
    let mut quote_opened_at = line;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_opened_at = line;
            }
            '\r' => {}
            '\n' => {
                line += 1;
                finish_record(&mut records, &mut record, &mut field);
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(ImportError::Malformed {
            line: quote_opened_at,
            message: "unterminated quoted field".to_string(),
        });
    }
    finish_record(&mut records, &mut record, &mut field);

    let mut records = records.into_iter();
    let headers = records
        .next()
        .map(|row| row.into_iter().map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();
    Ok(CsvTable {
        headers,
        rows: records.collect(),
    })
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    record.push(std::mem::take(field));
    let row = std::mem::take(record);
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        records.push(row);
    }
}

/// Map table rows onto transfers using `columns`. `default_currency` is used
/// when no currency column is configured.
pub fn transfers_from_table(
    table: &CsvTable,
    columns: &ColumnMap,
    default_currency: &str,
) -> Result<Vec<Transfer>, ImportError> {
    let index = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
    };
    let book_date = index(&columns.book_date)?;
    let val_date = columns.val_date.as_deref().map(index).transpose()?;
    let debitor = index(&columns.debitor)?;
    let creditor = index(&columns.creditor)?;
    let amount = index(&columns.amount)?;
    let currency = columns.currency.as_deref().map(index).transpose()?;
    let subject = columns
        .subject
        .iter()
        .map(|name| index(name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let cell = |i: usize| row.get(i).map(|v| v.trim().to_string()).unwrap_or_default();
            let book = cell(book_date);
            Transfer {
                val_date: val_date.map(cell).unwrap_or_else(|| book.clone()),
                book_date: book,
                debitor: cell(debitor),
                creditor: cell(creditor),
                amount: cell(amount),
                currency: currency
                    .map(cell)
                    .unwrap_or_else(|| default_currency.to_string()),
                subject: subject
                    .iter()
                    .map(|&i| cell(i))
                    .filter(|line| !line.is_empty())
                    .collect(),
            }
        })
        .collect())
}
