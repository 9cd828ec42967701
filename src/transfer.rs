//! CSV export and import of student records.

use crate::error::TransferError;
use crate::models::StudentInput;
use crate::store::RecordStore;
use std::path::Path;
use tracing::{info, warn};

/// The result of an import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// 1-indexed data rows (excluding the header) that could not be stored.
    pub rejected: Vec<usize>,
}

/// Writes every stored record to `path`, most recent prediction first. Returns the number of
/// records written.
pub fn export_csv(store: &RecordStore, path: &Path) -> Result<usize, TransferError> {
    let records = store.list_all()?;

    let mut writer = csv::Writer::from_path(path)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(count = records.len(), path = %path.display(), "exported records");
    Ok(records.len())
}

/// Reads submissions from the CSV file at `path` and upserts each of them.
///
/// Columns other than the submission fields (such as `promotion_status` in an exported file) are
/// ignored, since the status is always recomputed. Rows that cannot be parsed or that the store
/// rejects are skipped and reported in the summary.
pub fn import_csv(store: &RecordStore, path: &Path) -> Result<ImportSummary, TransferError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut summary = ImportSummary::default();

    for (index, row) in reader.deserialize::<StudentInput>().enumerate() {
        let row_number = index + 1;

        let input = match row {
            Ok(input) => input,
            Err(e) => {
                warn!(row = row_number, error = %e, "skipping unreadable row");
                summary.rejected.push(row_number);
                continue;
            }
        };

        match store.upsert(&input) {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!(row = row_number, student_id = input.student_id, error = %e, "skipping rejected row");
                summary.rejected.push(row_number);
            }
        }
    }

    info!(
        imported = summary.imported,
        rejected = summary.rejected.len(),
        path = %path.display(),
        "imported records"
    );
    Ok(summary)
}
