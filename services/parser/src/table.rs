//! Dataset parser: decodes a whole source file and drives the row parser.

use crate::dataset::Dataset;
use crate::record::Record;
use crate::row::{parse_row, RawRow};
use std::borrow::Cow;
use thiserror::Error;
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload for {dataset} is not valid UTF-8")]
    Encoding { dataset: Dataset },

    #[error("failed to read header of {dataset}: {source}")]
    Header {
        dataset: Dataset,
        #[source]
        source: csv::Error,
    },

    #[error("payload for {dataset} has no data rows")]
    NoRows { dataset: Dataset },
}

/// Decode raw payload bytes as UTF-8, dropping a leading BOM.
pub fn decode_payload(dataset: Dataset, bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    encoding_rs::UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(ParseError::Encoding { dataset })
}

/// Parse the text of a source file into records, in source row order.
///
/// The first line is the header. Lines the CSV reader cannot decode are
/// skipped with a warning; a missing header or a file without data lines
/// is an error.
pub fn try_parse_dataset(dataset: Dataset, content: &str) -> Result<Vec<Record>, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dataset.semantics().delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| ParseError::Header { dataset, source })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut rows = 0usize;
    let mut skipped = 0usize;

    for (line_idx, result) in reader.records().enumerate() {
        let line_num = line_idx + 2; // header is line 1
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(%dataset, line = line_num, error = %e, "skipping undecodable line");
                skipped += 1;
                continue;
            }
        };
        rows += 1;
        records.extend(parse_row(dataset, &RawRow::from_record(&headers, &record)));
    }

    if rows == 0 {
        return Err(ParseError::NoRows { dataset });
    }

    info!(
        %dataset,
        rows,
        skipped,
        records = records.len(),
        "parsed source file"
    );

    Ok(records)
}

/// Decode and parse raw payload bytes.
pub fn try_parse_payload(dataset: Dataset, bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
    let content = decode_payload(dataset, bytes)?;
    try_parse_dataset(dataset, &content)
}

/// Like [`try_parse_dataset`], but a parse failure is logged and yields an
/// empty list.
pub fn parse_dataset(dataset: Dataset, content: &str) -> Vec<Record> {
    try_parse_dataset(dataset, content).unwrap_or_else(|e| {
        warn!(%dataset, error = %e, "parse failed");
        Vec::new()
    })
}
