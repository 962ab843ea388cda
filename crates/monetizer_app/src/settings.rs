//! Router settings file.
//!
//! The file is optional RON; anything it leaves out comes from the
//! environment (`AMAZON_AFFILIATE_TAG`, `SKIMLINKS_PUB_ID`,
//! `MONETIZER_SKIP_DOMAINS`). Values in the file win over the environment,
//! domain lists are added to the built-in ones.
//!
//! ```ron
//! (
//!     amazon_tag: Some("site-20"),
//!     skimlinks_id: Some("102394X1592384"),
//!     skip_domains: ["mysite.com"],
//!     brand_tags: {"cookbooks": "cook-21"},
//! )
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use monetizer_core::{
    ConfigError, RouterConfig, ENV_AMAZON_TAG, ENV_SKIMLINKS_ID, ENV_SKIP_DOMAINS,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterFile {
    pub amazon_tag: Option<String>,
    pub skimlinks_id: Option<String>,
    /// Drop the built-in skip list before adding `skip_domains`.
    pub replace_default_skip_domains: bool,
    pub skip_domains: Vec<String>,
    pub amazon_domains: Vec<String>,
    pub short_domains: Vec<String>,
    pub brand_tags: BTreeMap<String, String>,
}

impl RouterFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read router settings {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid router settings {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

/// Merge the optional settings file with environment lookups.
pub fn build_router_config<F>(file: Option<RouterFile>, env: F) -> Result<RouterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = file.unwrap_or_default();
    let tag = file
        .amazon_tag
        .or_else(|| env(ENV_AMAZON_TAG))
        .ok_or(ConfigError::MissingAmazonTag)?;

    let mut builder = RouterConfig::builder(tag);
    if let Some(id) = file.skimlinks_id.or_else(|| env(ENV_SKIMLINKS_ID)) {
        builder = builder.skimlinks_id(id);
    }
    if file.replace_default_skip_domains {
        builder = builder.clear_skip_domains();
    }
    if let Some(extra) = env(ENV_SKIP_DOMAINS) {
        builder = builder.skip_domains(
            extra
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(ToOwned::to_owned),
        );
    }
    builder = builder.skip_domains(file.skip_domains);
    for domain in file.amazon_domains {
        builder = builder.amazon_domain(domain);
    }
    for domain in file.short_domains {
        builder = builder.short_domain(domain);
    }
    for (brand, tag) in file.brand_tags {
        builder = builder.brand_tag(brand, tag);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn file_values_override_environment() {
        let file = RouterFile::parse(
            r#"(
                amazon_tag: Some("file-20"),
                skip_domains: ["mysite.com"],
                brand_tags: {"cookbooks": "cook-21"},
            )"#,
        )
        .unwrap();
        let env = |key: &str| match key {
            ENV_AMAZON_TAG => Some("env-20".to_string()),
            ENV_SKIMLINKS_ID => Some("12345X678".to_string()),
            _ => None,
        };

        let config = build_router_config(Some(file), env).unwrap();
        assert_eq!(config.amazon_tag(), "file-20");
        assert_eq!(config.skimlinks_id(), Some("12345X678"));
        assert!(config.is_skipped_domain("mysite.com"));
        assert!(config.is_skipped_domain("facebook.com"));
        assert_eq!(config.tag_for(Some("cookbooks")), "cook-21");
    }

    #[test]
    fn default_skip_list_can_be_replaced() {
        let file = RouterFile {
            amazon_tag: Some("site-20".into()),
            replace_default_skip_domains: true,
            skip_domains: vec!["intranet.example".into()],
            ..RouterFile::default()
        };
        let config = build_router_config(Some(file), no_env).unwrap();
        assert!(!config.is_skipped_domain("facebook.com"));
        assert!(config.is_skipped_domain("intranet.example"));
    }

    #[test]
    fn missing_tag_everywhere_is_an_error() {
        assert_eq!(
            build_router_config(None, no_env).unwrap_err(),
            ConfigError::MissingAmazonTag
        );
    }

    #[test]
    fn mistyped_fields_are_rejected() {
        assert!(RouterFile::parse("(amazon_tag: 5)").is_err());
    }
}
