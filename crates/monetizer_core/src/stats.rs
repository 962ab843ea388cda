use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::LinkMethod;

/// Per-method link counts for one monetization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub amazon: u64,
    pub skimlinks: u64,
    pub passthrough: u64,
    pub skipped: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, method: LinkMethod) {
        match method {
            LinkMethod::Amazon => self.amazon += 1,
            LinkMethod::Skimlinks => self.skimlinks += 1,
            LinkMethod::Passthrough => self.passthrough += 1,
            LinkMethod::Skipped => self.skipped += 1,
        }
    }

    pub fn snapshot(&self) -> RunStats {
        *self
    }

    pub fn count(&self, method: LinkMethod) -> u64 {
        match method {
            LinkMethod::Amazon => self.amazon,
            LinkMethod::Skimlinks => self.skimlinks,
            LinkMethod::Passthrough => self.passthrough,
            LinkMethod::Skipped => self.skipped,
        }
    }

    pub fn total(&self) -> u64 {
        self.amazon + self.skimlinks + self.passthrough + self.skipped
    }

    /// Links that received affiliate tracking.
    pub fn monetized(&self) -> u64 {
        self.amazon + self.skimlinks
    }

    /// Fold another pass into this one. Only used when the caller wants
    /// totals across several documents.
    pub fn merge(&mut self, other: &RunStats) {
        self.amazon += other.amazon;
        self.skimlinks += other.skimlinks;
        self.passthrough += other.passthrough;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "amazon={} skimlinks={} passthrough={} skipped={}",
            self.amazon, self.skimlinks, self.passthrough, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_merge() {
        let mut first = RunStats::new();
        first.record(LinkMethod::Amazon);
        first.record(LinkMethod::Amazon);
        first.record(LinkMethod::Skipped);

        let mut second = RunStats::new();
        second.record(LinkMethod::Skimlinks);
        second.record(LinkMethod::Passthrough);

        first.merge(&second);
        assert_eq!(first.count(LinkMethod::Amazon), 2);
        assert_eq!(first.monetized(), 3);
        assert_eq!(first.total(), 5);
        assert_eq!(
            first.to_string(),
            "amazon=2 skimlinks=1 passthrough=1 skipped=1"
        );
    }
}
