use std::borrow::Cow;
use std::sync::LazyLock;

use monetizer_logging::{monetizer_debug, monetizer_info};
use regex::{Captures, Regex};

use crate::classify::classify;
use crate::config::RouterConfig;
use crate::rewrite::rewrite;
use crate::stats::RunStats;
use crate::types::MonetizedLink;

pub const SPONSORED_REL: &str = r#"rel="nofollow sponsored""#;

// One attribute: a name, optionally `=` and a value. Quotes only delimit a
// value right after `=`; an unquoted value runs to whitespace or `>`, so a
// stray apostrophe (`title=Bob's`) cannot carry the tag past its `>`.
const ATTR: &str = r#"[^\s"'>/=][^\s>/=]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>][^\s>]*))?"#;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"(?i)<a(?:[\s/]+{ATTR})*?[\s/]+href\s*=\s*(?:"([^"]*)"|'([^']*)')(?:[\s/]*{ATTR})*[\s/]*>"#
    );
    Regex::new(&pattern).expect("anchor pattern compiles")
});

// Used when an unterminated quoted value drags the match past a `<`: the
// anchor then ends at its first `>`.
static PLAIN_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"<>]*)"|'([^'<>]*)')[^>]*>"#)
        .expect("plain anchor pattern compiles")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"[\s/]*({ATTR})");
    Regex::new(&pattern).expect("attribute pattern compiles")
});

static AMPERSAND_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&(?:amp|#0*38|#x0*26);").expect("ampersand pattern compiles")
});

/// Result of one monetization pass over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetizedContent {
    pub html: String,
    pub stats: RunStats,
    /// Every anchor link found, in document order.
    pub links: Vec<MonetizedLink>,
}

impl MonetizedContent {
    pub fn stats(&self) -> RunStats {
        self.stats.snapshot()
    }
}

/// Classify and rewrite a single URL.
pub fn monetize_link(url: &str, config: &RouterConfig, brand: Option<&str>) -> MonetizedLink {
    let classification = classify(url, config);
    let monetized_url = rewrite(url, classification.method, config, brand);
    MonetizedLink {
        original_url: url.to_string(),
        monetized_url,
        method: classification.method,
        merchant: classification.merchant,
    }
}

/// Rewrite every `<a href>` in `html` and tally what happened.
///
/// Only the href value of each anchor is replaced; monetized anchors without
/// a `rel` attribute also get `rel="nofollow sponsored"`. All other markup is
/// copied through untouched. An href written with `&amp;` is routed as the
/// URL it stands for and written back with the same escaping.
pub fn monetize_content(
    html: &str,
    config: &RouterConfig,
    brand: Option<&str>,
) -> MonetizedContent {
    let mut stats = RunStats::new();
    let mut links = Vec::new();
    let mut output = String::with_capacity(html.len() + html.len() / 8);
    let mut cursor = 0;

    while let Some(caps) = next_anchor(html, cursor) {
        let (Some(tag), Some(value)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            break;
        };

        let link = monetize_attribute(value.as_str(), config, brand);
        stats.record(link.method);
        monetizer_debug!(
            "{} link merchant={:?} {} -> {}",
            link.method,
            link.merchant,
            link.original_url,
            link.monetized_url
        );

        let mut rewritten = String::with_capacity(tag.len() + link.monetized_url.len());
        rewritten.push_str(&html[tag.start()..value.start()]);
        rewritten.push_str(&link.monetized_url);
        rewritten.push_str(&html[value.end()..tag.end()]);
        if link.method.is_monetized() && !has_rel_attribute(&rewritten) {
            rewritten = inject_sponsored_rel(&rewritten);
        }

        output.push_str(&html[cursor..tag.start()]);
        output.push_str(&rewritten);
        cursor = tag.end();
        links.push(link);
    }
    output.push_str(&html[cursor..]);

    monetizer_info!("monetized document: {} ({} links)", stats, stats.total());

    MonetizedContent {
        html: output,
        stats,
        links,
    }
}

/// The next anchor at or after `from`. A match that runs into another tag
/// (an unterminated quote) is cut back to the anchor's first `>`, or passed
/// over when no plain anchor starts there.
fn next_anchor(html: &str, mut from: usize) -> Option<Captures<'_>> {
    loop {
        let caps = ANCHOR_RE.captures_at(html, from)?;
        let tag = caps.get(0)?;
        if !html[tag.start() + 1..tag.end()].contains('<') {
            return Some(caps);
        }
        match PLAIN_ANCHOR_RE.captures_at(html, tag.start()) {
            Some(plain) if plain.get(0).is_some_and(|m| m.start() == tag.start()) => {
                return Some(plain)
            }
            _ => from = tag.start() + 1,
        }
    }
}

/// Monetize an href exactly as written in the markup. The attribute value is
/// returned verbatim unless the link was rewritten.
fn monetize_attribute(value: &str, config: &RouterConfig, brand: Option<&str>) -> MonetizedLink {
    let url = decode_ampersands(value);
    let mut link = monetize_link(&url, config, brand);
    link.original_url = value.to_string();
    if !link.method.is_monetized() {
        link.monetized_url = value.to_string();
    } else if let Cow::Owned(_) = url {
        link.monetized_url = link.monetized_url.replace('&', "&amp;");
    }
    link
}

fn decode_ampersands(value: &str) -> Cow<'_, str> {
    AMPERSAND_REF_RE.replace_all(value, "&")
}

/// Whether an opening tag declares `rel`, with or without a value. Text
/// inside attribute values is never mistaken for an attribute.
pub fn has_rel_attribute(tag: &str) -> bool {
    let attrs = tag.get(2..).unwrap_or_default();
    ATTR_RE
        .captures_iter(attrs)
        .filter_map(|caps| caps.get(1))
        .any(|attr| {
            let name = attr.as_str().split('=').next().unwrap_or_default();
            name.trim_end().eq_ignore_ascii_case("rel")
        })
}

/// Insert the sponsored `rel` right before the tag's closing `>` (or `/>`).
fn inject_sponsored_rel(tag: &str) -> String {
    let body = tag.strip_suffix('>').unwrap_or(tag);
    let trimmed = body.trim_end();
    match trimmed.strip_suffix('/') {
        Some(head) => format!("{} {SPONSORED_REL} />", head.trim_end()),
        None => format!("{body} {SPONSORED_REL}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_detection_ignores_quoted_values() {
        assert!(has_rel_attribute(r#"<a href="x" rel="noopener">"#));
        assert!(has_rel_attribute(r#"<a REL='nofollow' href="x">"#));
        assert!(!has_rel_attribute(r#"<a href="x" title="see rel=here">"#));
        assert!(!has_rel_attribute(r#"<a href="x" data-rel="y">"#));
    }

    #[test]
    fn bare_rel_counts_as_declared() {
        assert!(has_rel_attribute(r#"<a href="https://amzn.to/x" rel>"#));
        assert!(has_rel_attribute(r#"<a href="x" rel/>"#));
        assert!(has_rel_attribute(r#"<a rel href="x">"#));
        assert!(!has_rel_attribute(r#"<a href="x" relation>"#));
    }

    #[test]
    fn stray_apostrophe_does_not_hide_a_later_rel() {
        assert!(has_rel_attribute(r#"<a href="x" title=Bob's rel='me'>"#));
        assert!(!has_rel_attribute(r#"<a href="x" title=Bob's>"#));
    }

    #[test]
    fn ampersand_references_decode_to_ampersands() {
        assert_eq!(decode_ampersands("?a=1&amp;b=2&#38;c=3&#x26;d"), "?a=1&b=2&c=3&d");
        assert!(matches!(decode_ampersands("?a=1&b=2"), Cow::Borrowed(_)));
    }

    #[test]
    fn rel_injection_handles_self_closing_tags() {
        assert_eq!(
            inject_sponsored_rel(r#"<a href="x">"#),
            r#"<a href="x" rel="nofollow sponsored">"#
        );
        assert_eq!(
            inject_sponsored_rel(r#"<a href="x" />"#),
            r#"<a href="x" rel="nofollow sponsored" />"#
        );
    }
}
