//! The output directory of a batch run.
//!
//! Every input is written back under its own file name, so two inputs that
//! share a name are rejected before anything is monetized. Documents are
//! staged in a hidden temp file next to their target and renamed into
//! place; a reader never sees a half-monetized page.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use monetizer_logging::monetizer_info;
use tempfile::Builder;
use thiserror::Error;

use crate::batch::{BatchReport, DocumentOutcome};

const STAGING_PREFIX: &str = ".monetize-";
const STAGING_SUFFIX: &str = ".partial";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output directory {path:?} is unusable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("refusing to write outside the output directory: {0:?}")]
    InvalidName(String),
    #[error("input {0:?} has no file name")]
    NoFileName(PathBuf),
    #[error("more than one input is named {0:?}; outputs would collide")]
    DuplicateName(String),
    #[error("{names} output names for {documents} documents")]
    NameCount { names: usize, documents: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Output file names for a batch, one per input, in input order.
pub fn output_names(inputs: &[PathBuf]) -> Result<Vec<String>, WriteError> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| WriteError::NoFileName(input.clone()))?;
        if !seen.insert(name.clone()) {
            return Err(WriteError::DuplicateName(name));
        }
        names.push(name);
    }
    Ok(names)
}

/// A directory that receives monetized documents and the ledger.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Open `path`, creating it when missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let path = path.into();
        let unusable = |reason: String| WriteError::OutputDir {
            path: path.clone(),
            reason,
        };

        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| unusable(e.to_string()))?;
        }
        let meta = fs::metadata(&path).map_err(|e| unusable(e.to_string()))?;
        if !meta.is_dir() {
            return Err(unusable("not a directory".into()));
        }
        if meta.permissions().readonly() {
            return Err(unusable("read-only".into()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically write `content` as `name`, replacing any earlier version.
    pub fn write_document(&self, name: &str, content: &str) -> Result<PathBuf, WriteError> {
        if !is_plain_file_name(name) {
            return Err(WriteError::InvalidName(name.to_string()));
        }

        let target = self.path.join(name);
        let mut staged = Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.path)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file_mut().sync_all()?;
        staged.persist(&target).map_err(|e| WriteError::Io(e.error))?;
        Ok(target)
    }

    /// Write every monetized document of `report`; `names[i]` is the output
    /// name of `report.documents[i]`. Skipped and failed documents leave
    /// their previous output, if any, untouched.
    pub fn write_report(
        &self,
        report: &BatchReport,
        names: &[String],
    ) -> Result<Vec<PathBuf>, WriteError> {
        if names.len() != report.documents.len() {
            return Err(WriteError::NameCount {
                names: names.len(),
                documents: report.documents.len(),
            });
        }

        let mut written = Vec::new();
        for (doc, name) in report.documents.iter().zip(names) {
            if let DocumentOutcome::Monetized { html, stats, .. } = &doc.outcome {
                let path = self.write_document(name, html)?;
                monetizer_info!("wrote {} from {} ({})", path.display(), doc.source, stats);
                written.push(path);
            }
        }
        Ok(written)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some()
}
