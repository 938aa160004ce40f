//! Parsing core for the viticulture statistics sources.
//!
//! Responsibilities:
//! - Describe the five source files and their column semantics
//! - Unpivot wide year columns into one normalized record per year
//! - Decode whole payloads with the right delimiter
//!
//! CRITICAL: parsing is DETERMINISTIC.
//! Same payload + same dataset = same records, in source row order.

pub mod dataset;
pub mod record;
pub mod row;
pub mod table;

pub use dataset::{ColumnSemantics, Dataset, LabelKind, UnknownDataset};
pub use record::{Label, Record};
pub use row::{parse_quantity, parse_row, RawRow};
pub use table::{decode_payload, parse_dataset, try_parse_dataset, try_parse_payload, ParseError};
