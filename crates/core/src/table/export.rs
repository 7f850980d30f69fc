//! CSV export of the processed (filtered and sorted) row set.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::CoreError;
use crate::formatting::format_iso_date;
use crate::table::column::Column;

/// UTF-8 byte-order mark. Spreadsheet tools need it to detect the encoding
/// of non-ASCII text such as Vietnamese diacritics.
pub const UTF8_BOM: &str = "\u{feff}";

/// Filename stem used when a table has no title.
pub const DEFAULT_EXPORT_TITLE: &str = "data";

/// A generated export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    /// Payload as text, BOM included.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Build a CSV export for `rows` over `columns`.
///
/// Cells use the column's rendered text (markup stripped) when a renderer
/// exists and the plain value otherwise. An empty row set is rejected rather
/// than producing an empty file.
///
/// Fields are quoted only when they contain a comma, quote or line break, with
/// one exception: a record made of a single empty field is written as `""` so
/// the line still reads back as a record instead of a blank line.
pub fn export_csv<R>(
    rows: &[&R],
    columns: &[&Column<R>],
    title: Option<&str>,
    today: NaiveDate,
) -> Result<CsvExport, CoreError> {
    if rows.is_empty() {
        return Err(CoreError::Validation("No data to export".to_string()));
    }
    if columns.is_empty() {
        return Err(CoreError::Validation(
            "No visible columns to export".to_string(),
        ));
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.as_bytes().to_vec());

    writer
        .write_record(columns.iter().map(|c| c.header()))
        .map_err(|e| CoreError::Internal(format!("Failed to write CSV header: {e}")))?;

    for row in rows {
        let record: Vec<String> = columns.iter().map(|c| cell_text(c, row)).collect();
        writer
            .write_record(&record)
            .map_err(|e| CoreError::Internal(format!("Failed to write CSV row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("Failed to flush CSV export: {e}")))?;

    Ok(CsvExport {
        filename: export_filename(title, today, "csv"),
        bytes,
    })
}

/// `<title-or-"data">_<YYYY-MM-DD>.<extension>`.
pub fn export_filename(title: Option<&str>, today: NaiveDate, extension: &str) -> String {
    let stem = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(sanitize_filename)
        .unwrap_or_else(|| DEFAULT_EXPORT_TITLE.to_string());
    format!("{stem}_{}.{extension}", format_iso_date(today))
}

fn cell_text<R>(column: &Column<R>, row: &R) -> String {
    if column.has_renderer() {
        strip_markup(&column.display_text(row))
    } else {
        column.value(row).to_string()
    }
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static TAG_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:<[^>]*>)+").expect("valid regex"));

/// Remove HTML-style tags, keeping the text between them as rendered.
///
/// A run of adjacent tags that separates two pieces of text (`A</span><span>B`)
/// becomes one space; any other tag is removed outright. Only the ends of the
/// result are trimmed.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for run in TAG_RUN_RE.find_iter(text) {
        out.push_str(&text[last..run.start()]);
        let before = out.chars().next_back();
        let after = text[run.end()..].chars().next();
        let separates_text = matches!(
            (before, after),
            (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace()
        );
        if separates_text && TAG_RE.find_iter(run.as_str()).nth(1).is_some() {
            out.push(' ');
        }
        last = run.end();
    }
    out.push_str(&text[last..]);
    out.trim().to_string()
}

fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
