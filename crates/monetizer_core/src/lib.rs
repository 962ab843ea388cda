//! Monetizer core: pure link classification and rewriting.
mod classify;
mod config;
mod disclosure;
mod rewrite;
mod scan;
mod stats;
mod types;

pub use classify::{classify, normalized_domain};
pub use config::{
    ConfigError, RouterConfig, RouterConfigBuilder, DEFAULT_AMAZON_DOMAINS,
    DEFAULT_SHORT_DOMAINS, DEFAULT_SKIP_DOMAINS, ENV_AMAZON_TAG, ENV_SKIMLINKS_ID,
    ENV_SKIP_DOMAINS,
};
pub use disclosure::{disclosure, disclosure_html, DisclosureStyle};
pub use rewrite::{quote_plus, rewrite, set_amazon_tag, skimlinks_wrap, SKIMLINKS_REDIRECT_BASE};
pub use scan::{has_rel_attribute, monetize_content, monetize_link, MonetizedContent, SPONSORED_REL};
pub use stats::RunStats;
pub use types::{Classification, LinkMethod, MonetizedLink};
