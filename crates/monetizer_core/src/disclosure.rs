use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureStyle {
    Short,
    Long,
}

const SHORT_DISCLOSURE: &str =
    "This post contains affiliate links. We may earn a commission if you make a purchase.";

const LONG_DISCLOSURE: &str = "Disclosure: Some of the links in this article are affiliate links, \
which means we may earn a small commission if you click through and make a purchase, at no \
additional cost to you. As an Amazon Associate we earn from qualifying purchases. We only \
recommend products we believe will add value for our readers.";

/// FTC disclosure text for `style`.
pub fn disclosure(style: DisclosureStyle) -> &'static str {
    match style {
        DisclosureStyle::Short => SHORT_DISCLOSURE,
        DisclosureStyle::Long => LONG_DISCLOSURE,
    }
}

/// Disclosure paragraph ready to be placed at the top of a document.
pub fn disclosure_html(style: DisclosureStyle) -> String {
    format!(
        "<p class=\"affiliate-disclosure\"><em>{}</em></p>\n",
        disclosure(style)
    )
}

impl FromStr for DisclosureStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(DisclosureStyle::Short),
            "long" => Ok(DisclosureStyle::Long),
            other => Err(format!("unknown disclosure style '{other}' (expected short or long)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_map_to_fixed_text() {
        assert!(disclosure(DisclosureStyle::Short).starts_with("This post contains affiliate"));
        assert!(disclosure(DisclosureStyle::Long).contains("Amazon Associate"));
        assert!(disclosure_html(DisclosureStyle::Short).starts_with("<p class=\"affiliate-disclosure\">"));
        assert_eq!("LONG".parse::<DisclosureStyle>(), Ok(DisclosureStyle::Long));
        assert!("medium".parse::<DisclosureStyle>().is_err());
    }
}
