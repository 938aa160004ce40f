//! Row parser: unpivots one wide source row into per-year records.
//!
//! Source rows look like `produto;1970;1971;...;2024` with the quantity for
//! each year in its own column. Each non-empty cell becomes one [`Record`].
//!
//! This module is DETERMINISTIC: the same row always yields the same records.

use crate::dataset::Dataset;
use crate::record::{Label, Record};

/// Cell values that mean "no data" in the source files.
const EMPTY_CELL_TOKENS: &[&str] = &["", "0", "nd", "*"];

/// One decoded source line: column label -> cell text, in file order.
///
/// Trade files repeat every year header (quantity, then value); lookups
/// return the first column with a given label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a CSV record with its header. Extra cells without a header are dropped.
    pub fn from_record(headers: &[String], record: &csv::StringRecord) -> Self {
        headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse one raw row of `dataset` into zero or more records.
///
/// Header/control rows and rows without a label yield nothing. Year columns
/// outside the dataset's range, empty or "no data" cells and unparseable
/// cells are skipped individually.
pub fn parse_row(dataset: Dataset, row: &RawRow) -> Vec<Record> {
    let semantics = dataset.semantics();

    let label = row.get(semantics.label_column).unwrap_or("").trim();
    if label.is_empty() || semantics.is_header_sentinel(label) {
        return Vec::new();
    }

    semantics
        .years()
        .filter_map(|year| {
            let cell = row.get(&year.to_string())?;
            let quantidade = parse_quantity(cell)?;
            Some(Record {
                ano: year,
                label: Label::new(semantics.label_kind, label),
                quantidade,
                unidade: semantics.unit.to_string(),
                tipo: semantics.direction.map(str::to_string),
            })
        })
        .collect()
}

/// Parse a quantity cell.
///
/// Comma is rewritten to period and the first period is the decimal point.
/// Further `.digits` groups are discarded, so `"1.234,5"` reads as `1.234`.
/// Anything other than digits and separators is rejected. The value is
/// truncated toward zero and only positive quantities are returned. The
/// whole-number group is read as an exact integer and must fit in `i64`.
pub fn parse_quantity(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if EMPTY_CELL_TOKENS.contains(&cell) {
        return None;
    }

    let normalized = cell.replace(',', ".");
    let mut groups = normalized.split('.');
    let whole = groups.next().unwrap_or("");
    let fraction = groups.next().unwrap_or("");

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !is_digits(whole) || !is_digits(fraction) || !groups.all(is_digits) {
        return None;
    }

    // Truncation keeps the whole-number group; values beyond i64 are rejected.
    let quantidade: i64 = whole.parse().ok()?;
    (quantidade > 0).then_some(quantidade)
}
