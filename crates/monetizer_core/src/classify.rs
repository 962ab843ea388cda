use url::Url;

use crate::config::RouterConfig;
use crate::types::{Classification, LinkMethod};

/// Decide how `url` should be monetized.
///
/// Guards run in a fixed order: non-HTTP, unparseable, skip-listed, Amazon,
/// then Skimlinks eligibility. Anything left over is passed through.
pub fn classify(url: &str, config: &RouterConfig) -> Classification {
    let trimmed = url.trim();
    if !is_http_url(trimmed) {
        return Classification::skipped();
    }

    let Some(merchant) = normalized_domain(trimmed) else {
        return Classification::skipped();
    };

    let method = if config.is_skipped_domain(&merchant) {
        LinkMethod::Skipped
    } else if config.is_amazon_domain(&merchant) {
        LinkMethod::Amazon
    } else if config.skimlinks_id().is_some() {
        LinkMethod::Skimlinks
    } else {
        LinkMethod::Passthrough
    };

    Classification { method, merchant }
}

/// Lowercased host with a leading `www.` removed, or `None` if the URL does
/// not parse or has no host.
pub fn normalized_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url
        .get(..8)
        .unwrap_or(url)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
