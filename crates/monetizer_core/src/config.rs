//! Router configuration.
//!
//! A [`RouterConfig`] is validated once when it is built and is read-only
//! afterwards, so a single instance can be shared by every worker that
//! monetizes documents.

use std::collections::{BTreeMap, BTreeSet};
use std::env;

use thiserror::Error;

/// Environment variable holding the default Amazon Associates tag.
pub const ENV_AMAZON_TAG: &str = "AMAZON_AFFILIATE_TAG";
/// Environment variable holding the Skimlinks publisher id.
pub const ENV_SKIMLINKS_ID: &str = "SKIMLINKS_PUB_ID";
/// Comma-separated list of extra domains that must never be monetized.
pub const ENV_SKIP_DOMAINS: &str = "MONETIZER_SKIP_DOMAINS";

pub const DEFAULT_AMAZON_DOMAINS: &[&str] = &[
    "amazon.com",
    "amazon.co.uk",
    "amazon.ca",
    "amazon.de",
    "amazon.fr",
    "amazon.it",
    "amazon.es",
    "amazon.nl",
    "amazon.se",
    "amazon.pl",
    "amazon.co.jp",
    "amazon.in",
    "amazon.com.au",
    "amazon.com.mx",
    "amazon.com.br",
    "amazon.com.be",
    "amazon.com.tr",
    "amazon.sg",
    "amazon.ae",
    "amazon.sa",
];

pub const DEFAULT_SHORT_DOMAINS: &[&str] = &["amzn.to", "amzn.com", "amzn.eu", "a.co"];

/// Internal, social, search and reference sites.
pub const DEFAULT_SKIP_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "pinterest.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "reddit.com",
    "google.com",
    "bing.com",
    "duckduckgo.com",
    "wikipedia.org",
    "en.wikipedia.org",
    "github.com",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing Amazon affiliate tag (set AMAZON_AFFILIATE_TAG)")]
    MissingAmazonTag,
    #[error("invalid affiliate tag {tag:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidTag { tag: String },
    #[error("invalid Skimlinks publisher id {id:?}")]
    InvalidSkimlinksId { id: String },
    #[error("invalid domain {domain:?}")]
    InvalidDomain { domain: String },
    #[error("brand key must not be empty")]
    EmptyBrandKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    amazon_tag: String,
    skimlinks_id: Option<String>,
    skip_domains: BTreeSet<String>,
    amazon_domains: BTreeSet<String>,
    short_domains: BTreeSet<String>,
    brand_tags: BTreeMap<String, String>,
}

impl RouterConfig {
    /// Starts a builder seeded with the default domain lists.
    pub fn builder(amazon_tag: impl Into<String>) -> RouterConfigBuilder {
        RouterConfigBuilder::new(amazon_tag)
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup, using the same
    /// variable names as [`RouterConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tag = lookup(ENV_AMAZON_TAG).ok_or(ConfigError::MissingAmazonTag)?;
        let mut builder = Self::builder(tag);
        if let Some(id) = lookup(ENV_SKIMLINKS_ID) {
            builder = builder.skimlinks_id(id);
        }
        if let Some(extra) = lookup(ENV_SKIP_DOMAINS) {
            builder = builder.skip_domains(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(ToOwned::to_owned),
            );
        }
        builder.build()
    }

    pub fn amazon_tag(&self) -> &str {
        &self.amazon_tag
    }

    pub fn skimlinks_id(&self) -> Option<&str> {
        self.skimlinks_id.as_deref()
    }

    pub fn skip_domains(&self) -> &BTreeSet<String> {
        &self.skip_domains
    }

    pub fn amazon_domains(&self) -> &BTreeSet<String> {
        &self.amazon_domains
    }

    pub fn short_domains(&self) -> &BTreeSet<String> {
        &self.short_domains
    }

    pub fn brand_tags(&self) -> &BTreeMap<String, String> {
        &self.brand_tags
    }

    /// Tag to inject for `brand`, falling back to the default Amazon tag
    /// when no brand is given or the brand has no dedicated tag.
    pub fn tag_for(&self, brand: Option<&str>) -> &str {
        brand
            .and_then(|b| self.brand_tags.get(b))
            .map(String::as_str)
            .unwrap_or(&self.amazon_tag)
    }

    pub fn is_skipped_domain(&self, domain: &str) -> bool {
        self.skip_domains.contains(domain)
    }

    /// True when `domain` equals, or is a subdomain of, a known Amazon domain.
    pub fn is_amazon_domain(&self, domain: &str) -> bool {
        self.amazon_domains
            .iter()
            .chain(self.short_domains.iter())
            .any(|known| domain_matches(domain, known))
    }
}

fn domain_matches(domain: &str, known: &str) -> bool {
    domain == known
        || domain
            .strip_suffix(known)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

pub struct RouterConfigBuilder {
    amazon_tag: String,
    skimlinks_id: Option<String>,
    skip_domains: Vec<String>,
    amazon_domains: Vec<String>,
    short_domains: Vec<String>,
    brand_tags: Vec<(String, String)>,
}

impl RouterConfigBuilder {
    fn new(amazon_tag: impl Into<String>) -> Self {
        Self {
            amazon_tag: amazon_tag.into(),
            skimlinks_id: None,
            skip_domains: to_owned_list(DEFAULT_SKIP_DOMAINS),
            amazon_domains: to_owned_list(DEFAULT_AMAZON_DOMAINS),
            short_domains: to_owned_list(DEFAULT_SHORT_DOMAINS),
            brand_tags: Vec::new(),
        }
    }

    /// An empty id disables Skimlinks routing.
    pub fn skimlinks_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.skimlinks_id = if id.trim().is_empty() {
            None
        } else {
            Some(id.trim().to_string())
        };
        self
    }

    pub fn skip_domain(mut self, domain: impl Into<String>) -> Self {
        self.skip_domains.push(domain.into());
        self
    }

    pub fn skip_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_domains.extend(domains.into_iter().map(Into::into));
        self
    }

    /// Removes the built-in skip list; domains added afterwards still apply.
    pub fn clear_skip_domains(mut self) -> Self {
        self.skip_domains.clear();
        self
    }

    pub fn amazon_domain(mut self, domain: impl Into<String>) -> Self {
        self.amazon_domains.push(domain.into());
        self
    }

    pub fn short_domain(mut self, domain: impl Into<String>) -> Self {
        self.short_domains.push(domain.into());
        self
    }

    pub fn brand_tag(mut self, brand: impl Into<String>, tag: impl Into<String>) -> Self {
        self.brand_tags.push((brand.into(), tag.into()));
        self
    }

    pub fn build(self) -> Result<RouterConfig, ConfigError> {
        let amazon_tag = self.amazon_tag.trim().to_string();
        if amazon_tag.is_empty() {
            return Err(ConfigError::MissingAmazonTag);
        }
        validate_tag(&amazon_tag)?;

        if let Some(id) = &self.skimlinks_id {
            if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::InvalidSkimlinksId { id: id.clone() });
            }
        }

        let mut brand_tags = BTreeMap::new();
        for (brand, tag) in self.brand_tags {
            let brand = brand.trim().to_string();
            if brand.is_empty() {
                return Err(ConfigError::EmptyBrandKey);
            }
            let tag = tag.trim().to_string();
            validate_tag(&tag)?;
            brand_tags.insert(brand, tag);
        }

        Ok(RouterConfig {
            amazon_tag,
            skimlinks_id: self.skimlinks_id,
            skip_domains: normalize_domains(self.skip_domains)?,
            amazon_domains: normalize_domains(self.amazon_domains)?,
            short_domains: normalize_domains(self.short_domains)?,
            brand_tags,
        })
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn validate_tag(tag: &str) -> Result<(), ConfigError> {
    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTag {
            tag: tag.to_string(),
        })
    }
}

/// Domains are stored the way the classifier compares them: lowercase, no `www.`.
fn normalize_domains(domains: Vec<String>) -> Result<BTreeSet<String>, ConfigError> {
    domains
        .into_iter()
        .map(|raw| {
            let lowered = raw.trim().to_ascii_lowercase();
            let domain = lowered.strip_prefix("www.").unwrap_or(&lowered).to_string();
            let valid = !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
            if valid {
                Ok(domain)
            } else {
                Err(ConfigError::InvalidDomain { domain: raw })
            }
        })
        .collect()
}
