//! Raw delimited tables and header normalization.
//!
//! Files are read as bytes and decoded lossily per cell, so a stray
//! non-UTF-8 byte in one cell never fails the whole source. Rows may be
//! ragged: a row shorter than the header reads its missing cells as empty
//! strings.

use std::sync::LazyLock;

use ev_map_source_models::SourceKind;
use regex::Regex;

/// Whitespace inside a column name.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("valid regex"));

/// Anything that is not allowed in a normalized column name.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("valid regex"));

/// An in-memory table of string cells read from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    kind: SourceKind,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A borrowed view of one row in a [`RawTable`].
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    table: &'a RawTable,
    cells: &'a [String],
}

impl<'a> RawRow<'a> {
    /// Returns the cell under `column`, or `None` if the table has no such
    /// column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.column(column).map(|index| self.at(index))
    }

    /// Returns the cell at `index`, or `""` when the row is too short.
    #[must_use]
    pub fn at(&self, index: usize) -> &'a str {
        self.cells.get(index).map_or("", String::as_str)
    }

    /// Number of cells actually present in this row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.cells.len()
    }
}

impl RawTable {
    /// Creates a table from already-split cells.
    #[must_use]
    pub const fn new(kind: SourceKind, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            kind,
            headers,
            rows,
        }
    }

    /// The source this table was read from.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Column names. Empty for positional tables.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named exactly `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns `true` if the table has a column named exactly `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Iterates over the data rows.
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |cells| RawRow {
            table: self,
            cells,
        })
    }

    /// Returns a new table whose column names are normalized with
    /// [`normalize_column_name`]. Cells are untouched.
    #[must_use]
    pub fn normalize_headers(self) -> Self {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect();

        log::debug!("[{}] Normalized columns: {headers:?}", self.kind);

        Self {
            kind: self.kind,
            headers,
            rows: self.rows,
        }
    }

    /// Returns a new table keeping only the rows matching `keep`.
    #[must_use]
    pub fn filter(self, mut keep: impl FnMut(&RawRow<'_>) -> bool) -> Self {
        let kept: Vec<Vec<String>> = self
            .rows
            .iter()
            .filter(|cells| {
                keep(&RawRow {
                    table: &self,
                    cells,
                })
            })
            .cloned()
            .collect();

        Self {
            kind: self.kind,
            headers: self.headers,
            rows: kept,
        }
    }
}

/// Normalizes a raw column name: trimmed, lower-cased, each whitespace
/// character replaced by `_`, and anything outside `[a-z0-9_]` removed.
///
/// ```
/// use ev_map_source::table::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Value (Dollars)"), "value_dollars");
/// assert_eq!(normalize_column_name(" EV Level2 EVSE Num "), "ev_level2_evse_num");
/// ```
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let underscored = WHITESPACE_RE.replace_all(&lower, "_");
    DISALLOWED_RE.replace_all(&underscored, "").into_owned()
}

/// Parses headed CSV bytes. Returns `Ok(None)` when no header row remains
/// after skipping `skip_lines` lines.
///
/// # Errors
///
/// Returns [`csv::Error`] if the data is not parseable.
pub fn parse_headed(
    kind: SourceKind,
    data: &[u8],
    skip_lines: usize,
) -> Result<Option<RawTable>, csv::Error> {
    let mut records = parse_records(skip(data, skip_lines))?.into_iter();

    let Some(headers) = records.next() else {
        return Ok(None);
    };

    Ok(Some(RawTable::new(kind, headers, records.collect())))
}

/// Parses header-less CSV bytes.
///
/// # Errors
///
/// Returns [`csv::Error`] if the data is not parseable.
pub fn parse_positional(kind: SourceKind, data: &[u8]) -> Result<RawTable, csv::Error> {
    Ok(RawTable::new(kind, Vec::new(), parse_records(data)?))
}

fn parse_records(data: &[u8]) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
                .collect(),
        );
    }

    Ok(rows)
}

/// Drops the first `lines` newline-terminated lines of `data`.
fn skip(data: &[u8], lines: usize) -> &[u8] {
    let mut rest = data;
    for _ in 0..lines {
        match rest.iter().position(|b| *b == b'\n') {
            Some(end) => rest = &rest[end + 1..],
            None => return &[],
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_column_names() {
        assert_eq!(normalize_column_name("County"), "county");
        assert_eq!(normalize_column_name("Primary Customer City"), "primary_customer_city");
        assert_eq!(
            normalize_column_name("Rank within US (of 3141 counties)"),
            "rank_within_us_of_3141_counties"
        );
        assert_eq!(normalize_column_name("State Abbreviation"), "state_abbreviation");
        assert_eq!(normalize_column_name("\u{feff}VIN"), "vin");
        assert_eq!(normalize_column_name("Fuel-Code"), "fuelcode");
    }

    #[test]
    fn skips_preamble_lines_before_header() {
        let data = b"Title line\nSecond, with comma\n\nSource: export\n\
            County,Value (Dollars)\nHartford County,80000\n";
        let table = parse_headed(SourceKind::Income, data, 4).unwrap().unwrap();

        assert_eq!(table.headers(), ["County", "Value (Dollars)"]);
        assert_eq!(table.len(), 1);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("County"), Some("Hartford County"));
    }

    #[test]
    fn missing_header_after_skip() {
        let data = b"only\ntwo lines\n";
        assert!(parse_headed(SourceKind::Income, data, 4).unwrap().is_none());
    }

    #[test]
    fn ragged_rows_read_as_empty_cells() {
        let data = b"a,b,c\n1,2\n4,5,6,7\n";
        let table = parse_headed(SourceKind::Stations, data, 0).unwrap().unwrap();
        let rows: Vec<RawRow<'_>> = table.rows().collect();

        assert_eq!(rows[0].get("c"), Some(""));
        assert_eq!(rows[0].width(), 2);
        assert_eq!(rows[1].at(3), "7");
        assert_eq!(rows[1].get("missing"), None);
    }

    #[test]
    fn cells_are_trimmed_and_decoded_lossily() {
        let data = b"name,city\n  Lot A ,Hart\xffford\n";
        let table = parse_headed(SourceKind::Stations, data, 0).unwrap().unwrap();
        let row = table.rows().next().unwrap();

        assert_eq!(row.get("name"), Some("Lot A"));
        assert!(row.get("city").unwrap().starts_with("Hart"));
    }

    #[test]
    fn positional_tables_have_no_headers() {
        let data = b"1,CT,\"Hartford, CT\"\n2,MA,\"Boston, MA\"\n";
        let table = parse_positional(SourceKind::Population, data).unwrap();

        assert!(table.headers().is_empty());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows().next().unwrap().at(2), "Hartford, CT");
    }

    #[test]
    fn normalize_and_filter_produce_new_tables() {
        let data = b"State,City Name\nCT,Hartford\nMA,Boston\n";
        let table = parse_headed(SourceKind::Vehicles, data, 0)
            .unwrap()
            .unwrap()
            .normalize_headers();

        assert!(table.has_column("city_name"));
        let ct = table.filter(|row| row.get("state") == Some("CT"));
        assert_eq!(ct.len(), 1);
        assert_eq!(ct.kind(), SourceKind::Vehicles);
    }
}
