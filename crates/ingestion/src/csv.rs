//! Delimited-text parsing for extracts.
//!
//! Extracts are small enough to hold in memory, so parsing works on the full
//! text and returns owned rows.

use ::csv::{ReaderBuilder, Terminator, WriterBuilder};
use roomberg_core::{Error, RawRow, Result};
use tracing::debug;

/// Field delimiter and quote byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// A parsed extract: trimmed header names plus one raw row per data line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<RawRow>,
}

impl Table {
    /// Whether the table has no header.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Split text into rows of fields.
///
/// A doubled quote inside a quoted field is a literal quote; delimiters and
/// line breaks inside quotes belong to the field. Rows may differ in length,
/// and an empty final fragment does not produce a row.
pub fn parse_rows(text: &str, dialect: &Dialect) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .from_reader(text.as_bytes());

    reader
        .records()
        .enumerate()
        .filter_map(|(index, record)| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect()),
            Err(e) => {
                debug!(line = index + 1, error = %e, "skipping unreadable extract row");
                None
            }
        })
        .collect()
}

/// Parse text into a header plus records zipped positionally against it.
///
/// Missing trailing fields become empty strings; extra fields are ignored.
pub fn parse_table(text: &str, dialect: &Dialect) -> Table {
    let mut rows = parse_rows(text, dialect).into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|h| h.trim().to_string()).collect(),
        None => return Table::default(),
    };

    let records = rows
        .map(|fields| {
            let mut fields = fields.into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), fields.next().unwrap_or_default()))
                .collect()
        })
        .collect();

    Table { headers, records }
}

/// Serialize rows, quoting fields that need it. Lines end with `\r\n`.
pub fn write_rows(rows: &[Vec<String>], dialect: &Dialect) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| Error::data(format!("cannot write extract row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::data(format!("cannot flush extract: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::data(format!("extract is not UTF-8: {e}")))
}
