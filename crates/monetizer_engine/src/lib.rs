//! Monetizer engine: batch processing, output persistence and the
//! processed-document ledger.
mod batch;
mod fingerprint;
mod ledger;
mod persist;

pub use batch::{
    run_batch, BatchError, BatchReport, BatchSettings, DocumentInput, DocumentOutcome,
    DocumentReport,
};
pub use fingerprint::content_fingerprint;
pub use ledger::{Ledger, LedgerEntry, LedgerError, LEDGER_FILENAME};
pub use persist::{output_names, OutputDir, WriteError};
