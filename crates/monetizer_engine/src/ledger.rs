//! Record of documents that already went through the router.
//!
//! Skimlinks wrapping is not idempotent, so feeding a monetized document
//! back in would wrap its links twice. The ledger remembers the fingerprint
//! of every output it has written and lets the batch engine recognise them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use monetizer_core::RunStats;
use monetizer_logging::{monetizer_info, monetizer_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{OutputDir, WriteError};

pub const LEDGER_FILENAME: &str = ".monetizer_ledger.ron";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write ledger: {0}")]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub source: String,
    /// Fingerprint of the monetized output.
    pub fingerprint: String,
    pub stats: RunStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedLedger {
    processed: Vec<LedgerEntry>,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    dir: PathBuf,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// An empty ledger stored in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: Vec::new(),
        }
    }

    /// Load the ledger from `dir`. A missing or unreadable file yields an
    /// empty ledger; the problem is logged, not returned.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(LEDGER_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::new(dir),
            Err(err) => {
                monetizer_warn!("Failed to read ledger from {:?}: {}", path, err);
                return Self::new(dir);
            }
        };

        let persisted: PersistedLedger = match ron::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                monetizer_warn!("Failed to parse ledger from {:?}: {}", path, err);
                return Self::new(dir);
            }
        };

        monetizer_info!(
            "Loaded ledger with {} processed documents from {:?}",
            persisted.processed.len(),
            path
        );
        Self {
            dir: dir.to_path_buf(),
            entries: persisted.processed,
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if some recorded output has this fingerprint.
    pub fn contains_output(&self, fingerprint: &str) -> bool {
        self.entries.iter().any(|e| e.fingerprint == fingerprint)
    }

    pub fn entry_for(&self, source: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.source == source)
    }

    /// Add an entry, replacing any earlier record for the same source.
    pub fn record(&mut self, entry: LedgerEntry) {
        match self.entries.iter_mut().find(|e| e.source == entry.source) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn save(&self) -> Result<PathBuf, LedgerError> {
        let persisted = PersistedLedger {
            processed: self.entries.clone(),
        };
        let content = ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::new())?;
        let path = OutputDir::open(self.dir.clone())?.write_document(LEDGER_FILENAME, &content)?;
        Ok(path)
    }
}
