//! Parallel monetization of many documents against one shared config.

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use monetizer_core::{disclosure_html, monetize_content, DisclosureStyle, RouterConfig, RunStats};
use monetizer_logging::{monetizer_info, monetizer_warn, DocumentScope};
use thiserror::Error;

use crate::fingerprint::content_fingerprint;
use crate::ledger::{Ledger, LedgerEntry};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read document {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document {path:?} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Already-loaded HTML, e.g. from stdin.
    Inline { label: String, html: String },
    File(PathBuf),
}

impl DocumentInput {
    pub fn inline(label: impl Into<String>, html: impl Into<String>) -> Self {
        DocumentInput::Inline {
            label: label.into(),
            html: html.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        DocumentInput::File(path.into())
    }

    pub fn label(&self) -> String {
        match self {
            DocumentInput::Inline { label, .. } => label.clone(),
            DocumentInput::File(path) => path.display().to_string(),
        }
    }

    fn load(&self) -> Result<String, BatchError> {
        match self {
            DocumentInput::Inline { html, .. } => Ok(html.clone()),
            DocumentInput::File(path) => read_document(path),
        }
    }
}

fn read_document(path: &Path) -> Result<String, BatchError> {
    let bytes = fs::read(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| BatchError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub workers: usize,
    /// Monetize documents even when the ledger says they were already processed.
    pub force: bool,
    /// Prepended to documents that end up with at least one affiliate link.
    pub disclosure: Option<DisclosureStyle>,
    pub brand: Option<String>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            force: false,
            disclosure: None,
            brand: None,
        }
    }
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Monetized {
        html: String,
        stats: RunStats,
        fingerprint: String,
    },
    AlreadyProcessed,
    Failed(BatchError),
}

#[derive(Debug)]
pub struct DocumentReport {
    pub source: String,
    pub outcome: DocumentOutcome,
}

#[derive(Debug)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub totals: RunStats,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn monetized(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Monetized { .. }))
    }

    pub fn already_processed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::AlreadyProcessed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }

    /// Record every monetized document in `ledger`.
    pub fn record_into(&self, ledger: &mut Ledger) {
        for doc in &self.documents {
            if let DocumentOutcome::Monetized {
                stats, fingerprint, ..
            } = &doc.outcome
            {
                ledger.record(LedgerEntry {
                    source: doc.source.clone(),
                    fingerprint: fingerprint.clone(),
                    stats: *stats,
                });
            }
        }
    }

    pub fn summary(&self) -> String {
        let total = self.documents.len();
        let secs = self.elapsed.as_secs_f64();
        let throughput = if secs > 0.0 { total as f64 / secs } else { 0.0 };
        format!(
            "Monetization Summary\n\
             ====================\n\
             Documents:         {total}\n\
             Monetized:         {}\n\
             Already processed: {}\n\
             Failed:            {}\n\
             Links:             {} (total {})\n\
             Duration:          {secs:.2}s\n\
             Throughput:        {throughput:.1} docs/sec",
            self.monetized(),
            self.already_processed(),
            self.failed(),
            self.totals,
            self.totals.total(),
        )
    }
}

/// Monetize every input, spreading the work over `settings.workers` threads.
///
/// Reports come back in input order. The ledger is only read here; call
/// [`BatchReport::record_into`] to update it.
pub fn run_batch(
    inputs: &[DocumentInput],
    config: &RouterConfig,
    ledger: &Ledger,
    settings: &BatchSettings,
) -> BatchReport {
    let started = Instant::now();
    let workers = settings.workers.max(1).min(inputs.len().max(1));
    let next = AtomicUsize::new(0);
    let next = &next;

    let mut indexed: Vec<(usize, DocumentReport)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(move |_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(input) = inputs.get(index) else {
                            break;
                        };
                        done.push((index, process_document(input, config, ledger, settings)));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });
    indexed.sort_by_key(|(index, _)| *index);

    let documents: Vec<DocumentReport> = indexed.into_iter().map(|(_, report)| report).collect();
    let mut totals = RunStats::new();
    for doc in &documents {
        if let DocumentOutcome::Monetized { stats, .. } = &doc.outcome {
            totals.merge(stats);
        }
    }

    BatchReport {
        documents,
        totals,
        elapsed: started.elapsed(),
    }
}

fn process_document(
    input: &DocumentInput,
    config: &RouterConfig,
    ledger: &Ledger,
    settings: &BatchSettings,
) -> DocumentReport {
    let source = input.label();
    let _scope = DocumentScope::enter(source.clone());

    let html = match input.load() {
        Ok(html) => html,
        Err(err) => {
            monetizer_warn!("{}", err);
            return DocumentReport {
                source,
                outcome: DocumentOutcome::Failed(err),
            };
        }
    };

    if !settings.force && ledger.contains_output(&content_fingerprint(&html)) {
        monetizer_info!("already monetized; skipping");
        return DocumentReport {
            source,
            outcome: DocumentOutcome::AlreadyProcessed,
        };
    }

    let result = monetize_content(&html, config, settings.brand.as_deref());
    let html = match settings.disclosure {
        Some(style) if result.stats.monetized() > 0 => {
            format!("{}{}", disclosure_html(style), result.html)
        }
        _ => result.html,
    };

    DocumentReport {
        source,
        outcome: DocumentOutcome::Monetized {
            fingerprint: content_fingerprint(&html),
            html,
            stats: result.stats,
        },
    }
}
