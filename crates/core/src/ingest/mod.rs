//! CSV ingest for the raw advisor exports.

mod csv_parser;

pub use csv_parser::{parse_csv, ParseIssue, ParsedSheet};
