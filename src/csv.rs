//! Minimal CSV conversion used by the import and export endpoints.
//!
//! Values are joined and split on commas with no quoting or escaping. A value
//! containing a comma or a line break does not survive a round trip.

use thiserror::Error;

use crate::validation::FormFields;

/// One row as ordered `(column, value)` pairs.
pub type Record = Vec<(String, String)>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("cannot encode an empty record set")]
    Empty,
}

/// Header from the first record's keys, then one line of values per record.
pub fn encode(records: &[Record]) -> Result<String, CsvError> {
    let first = records.first().ok_or(CsvError::Empty)?;

    let header = first
        .iter()
        .map(|(key, _)| key.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        lines.push(
            record
                .iter()
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    Ok(lines.join("\n"))
}

/// Line 0 names the columns; every later line is zipped onto them by position.
///
/// Short rows lack the trailing columns, surplus fields are dropped.
pub fn decode(text: &str) -> Vec<FormFields> {
    let mut lines = text.lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let keys: Vec<&str> = header.split(',').collect();

    lines
        .map(|line| {
            keys.iter()
                .zip(line.split(','))
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}
