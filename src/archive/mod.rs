//! Archive file reading and decoding.
//!
//! This module acquires the exported conversation archive: the file is read
//! in full, decoded into raw records, and released. Only a malformed top
//! level is fatal; damaged fields inside a record are absorbed later during
//! normalization.

use crate::models::RawRecord;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failure to obtain raw records from an archive.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The archive file could not be read.
    #[error("cannot process archive: failed to read {path}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The top level is not a sequence of record-like objects.
    #[error("cannot process archive: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Read and decode an archive file into raw conversation records.
pub fn read_archive(path: &Path) -> Result<Vec<RawRecord>, ParseError> {
    debug!("Reading archive: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_records(&content)
}

/// Decode the top-level record sequence.
///
/// The top level must be a JSON array whose elements are objects; anything
/// else fails. Record fields of unexpected types are tolerated and surface
/// as `None` on the raw record.
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>, ParseError> {
    let records: Vec<RawRecord> = serde_json::from_str(content)?;
    debug!("Decoded {} records", records.len());
    Ok(records)
}
