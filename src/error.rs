//! Error types shared by the store and the CSV transfer layer.

use thiserror::Error;

/// A failure while talking to the record store.
///
/// Store errors are always reported back to the caller; none of the store operations panic.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened.
    #[error("could not open the record store at '{url}': {source}")]
    Connection {
        url: String,
        #[source]
        source: diesel::ConnectionError,
    },

    /// A query failed, including `CHECK` and other constraint violations.
    #[error("record store query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// A failure while exporting or importing records as CSV.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// An unknown label was read back for one of the enum columns.
#[derive(Debug, Error)]
#[error("unknown {kind} label '{label}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub label: String,
}
