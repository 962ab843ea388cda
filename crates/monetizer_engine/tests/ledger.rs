use std::fs;

use monetizer_core::RunStats;
use monetizer_engine::{Ledger, LedgerEntry, LEDGER_FILENAME};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn entry(source: &str, fingerprint: &str, amazon: u64) -> LedgerEntry {
    LedgerEntry {
        source: source.to_string(),
        fingerprint: fingerprint.to_string(),
        stats: RunStats {
            amazon,
            ..RunStats::default()
        },
    }
}

#[test]
fn missing_ledger_loads_empty() {
    let temp = TempDir::new().unwrap();
    let ledger = Ledger::load(temp.path());
    assert!(ledger.is_empty());
}

#[test]
fn saved_entries_are_restored() {
    let temp = TempDir::new().unwrap();
    let mut ledger = Ledger::new(temp.path());
    ledger.record(entry("a.html", "aaaa", 2));
    ledger.record(entry("b.html", "bbbb", 0));
    ledger.save().unwrap();

    let restored = Ledger::load(temp.path());
    assert_eq!(restored.entries(), ledger.entries());
    assert!(restored.contains_output("bbbb"));
    assert!(!restored.contains_output("cccc"));
}

#[test]
fn recording_same_source_replaces_entry() {
    let temp = TempDir::new().unwrap();
    let mut ledger = Ledger::new(temp.path());
    ledger.record(entry("a.html", "old", 1));
    ledger.record(entry("a.html", "new", 3));

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entry_for("a.html"), Some(&entry("a.html", "new", 3)));
    assert!(!ledger.contains_output("old"));
}

#[test]
fn corrupt_ledger_is_ignored() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(LEDGER_FILENAME), "not ron at all {").unwrap();
    let ledger = Ledger::load(temp.path());
    assert!(ledger.is_empty());
}
