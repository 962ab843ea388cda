use monetizer_logging::monetizer_warn;
use url::form_urlencoded;
use url::Url;

use crate::config::RouterConfig;
use crate::types::LinkMethod;

pub const SKIMLINKS_REDIRECT_BASE: &str = "https://go.redirectingat.com/";
const AMAZON_TAG_PARAM: &str = "tag";

/// Produce the monetized form of `url` for an already-classified link.
///
/// Never fails: URLs that cannot be parsed still receive a tag through
/// plain string concatenation.
pub fn rewrite(
    url: &str,
    method: LinkMethod,
    config: &RouterConfig,
    brand: Option<&str>,
) -> String {
    match method {
        LinkMethod::Amazon => set_amazon_tag(url, config.tag_for(brand)),
        LinkMethod::Skimlinks => match config.skimlinks_id() {
            Some(id) => skimlinks_wrap(url, id),
            None => {
                monetizer_warn!("skimlinks rewrite requested without a publisher id; leaving {url}");
                url.to_string()
            }
        },
        LinkMethod::Passthrough | LinkMethod::Skipped => url.to_string(),
    }
}

/// Set (or replace) the `tag` query parameter, keeping every other part of
/// the URL intact. An existing `tag` keeps its position; duplicates collapse
/// into one. Other parameters are copied byte for byte, encoding included.
pub fn set_amazon_tag(url: &str, tag: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed,
        _ => return append_tag_naively(url, tag),
    };

    let tag_segment = format!("{AMAZON_TAG_PARAM}={tag}");
    let mut segments: Vec<&str> = Vec::new();
    let mut replaced = false;
    for segment in parsed.query().unwrap_or_default().split('&') {
        if segment.is_empty() {
            continue;
        }
        if is_tag_segment(segment) {
            if !replaced {
                segments.push(&tag_segment);
                replaced = true;
            }
        } else {
            segments.push(segment);
        }
    }
    if !replaced {
        segments.push(&tag_segment);
    }

    let query = segments.join("&");
    parsed.set_query(Some(&query));
    parsed.into()
}

fn is_tag_segment(segment: &str) -> bool {
    let key = segment.split_once('=').map_or(segment, |(key, _)| key);
    key == AMAZON_TAG_PARAM
}

fn append_tag_naively(url: &str, tag: &str) -> String {
    monetizer_warn!("structured tag injection failed; appending tag to {url}");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{AMAZON_TAG_PARAM}={tag}")
}

/// Wrap `url` in the Skimlinks redirector for publisher `id`.
pub fn skimlinks_wrap(url: &str, id: &str) -> String {
    format!("{SKIMLINKS_REDIRECT_BASE}?id={id}&url={}", quote_plus(url))
}

/// Form-style percent-encoding: only ASCII alphanumerics and `_.-~` stay
/// literal, spaces become `+`.
pub fn quote_plus(input: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(input.as_bytes()).collect();
    // byte_serialize keeps '*' literal and escapes '~'; swap both.
    encoded.replace('*', "%2A").replace("%7E", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plus_matches_form_encoding_rules() {
        assert_eq!(
            quote_plus("https://www.barnesandnoble.com/w/x"),
            "https%3A%2F%2Fwww.barnesandnoble.com%2Fw%2Fx"
        );
        assert_eq!(quote_plus("a b*c~d"), "a+b%2Ac~d");
        assert_eq!(quote_plus("q=1&r=ü"), "q%3D1%26r%3D%C3%BC");
    }

    #[test]
    fn only_exact_tag_keys_are_replaced() {
        assert!(is_tag_segment("tag=old-20"));
        assert!(is_tag_segment("tag"));
        assert!(!is_tag_segment("tags=1"));
        assert!(!is_tag_segment("amp;tag=x"));
    }

    #[test]
    fn naive_append_picks_separator() {
        assert_eq!(append_tag_naively("not a url", "t-20"), "not a url?tag=t-20");
        assert_eq!(append_tag_naively("bad?x=1", "t-20"), "bad?x=1&tag=t-20");
    }

    #[test]
    fn unparseable_amazon_url_falls_back_to_concatenation() {
        assert_eq!(
            set_amazon_tag("http://[amazon.com/dp/X", "t-20"),
            "http://[amazon.com/dp/X?tag=t-20"
        );
    }
}
