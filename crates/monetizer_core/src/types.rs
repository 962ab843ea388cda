use std::fmt;

use serde::{Deserialize, Serialize};

/// How a single link was monetized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMethod {
    Amazon,
    Skimlinks,
    Passthrough,
    Skipped,
}

impl LinkMethod {
    /// Whether links of this kind carry affiliate tracking and need a `rel` disclosure.
    pub fn is_monetized(self) -> bool {
        matches!(self, LinkMethod::Amazon | LinkMethod::Skimlinks)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkMethod::Amazon => "amazon",
            LinkMethod::Skimlinks => "skimlinks",
            LinkMethod::Passthrough => "passthrough",
            LinkMethod::Skipped => "skipped",
        }
    }
}

impl fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub method: LinkMethod,
    /// Lowercased host without a leading `www.`; empty when the URL has no usable host.
    pub merchant: String,
}

impl Classification {
    pub(crate) fn skipped() -> Self {
        Self {
            method: LinkMethod::Skipped,
            merchant: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetizedLink {
    /// The href as written in the markup.
    pub original_url: String,
    /// What the href was replaced with; equal to `original_url` when the
    /// link was not rewritten.
    pub monetized_url: String,
    pub method: LinkMethod,
    pub merchant: String,
}
