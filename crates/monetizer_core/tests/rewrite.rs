use monetizer_core::{rewrite, set_amazon_tag, LinkMethod, RouterConfig};
use pretty_assertions::assert_eq;
use url::Url;

fn config() -> RouterConfig {
    RouterConfig::builder("site-20")
        .skimlinks_id("102394X1592384")
        .brand_tag("cookbooks", "cook-21")
        .build()
        .unwrap()
}

fn tag_values(url: &str) -> Vec<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .filter(|(k, _)| k == "tag")
        .map(|(_, v)| v.into_owned())
        .collect()
}

#[test]
fn amazon_tag_is_added_when_missing() {
    let out = rewrite(
        "https://www.amazon.com/dp/B08ABC1234",
        LinkMethod::Amazon,
        &config(),
        None,
    );
    assert_eq!(out, "https://www.amazon.com/dp/B08ABC1234?tag=site-20");
}

#[test]
fn existing_tag_is_replaced_and_other_params_kept() {
    let out = set_amazon_tag("https://amazon.com/dp/X?tag=old-20&ref=abc", "new-20");
    assert_eq!(out, "https://amazon.com/dp/X?tag=new-20&ref=abc");
}

#[test]
fn rewriting_twice_leaves_a_single_tag() {
    let config = config();
    let once = rewrite("https://www.amazon.com/dp/B0?th=1", LinkMethod::Amazon, &config, None);
    let twice = rewrite(&once, LinkMethod::Amazon, &config, None);
    assert_eq!(once, twice);
    assert_eq!(tag_values(&twice), vec!["site-20".to_string()]);
}

#[test]
fn duplicate_tags_collapse_into_one() {
    let out = set_amazon_tag("https://amazon.com/dp/X?tag=a-20&x=1&tag=b-20", "c-20");
    assert_eq!(out, "https://amazon.com/dp/X?tag=c-20&x=1");
}

#[test]
fn fragment_and_path_survive_tagging() {
    let out = set_amazon_tag("https://www.amazon.com/dp/B0/ref=sr_1?keywords=rust#reviews", "t-20");
    assert_eq!(out, "https://www.amazon.com/dp/B0/ref=sr_1?keywords=rust&tag=t-20#reviews");
}

#[test]
fn brand_specific_tag_wins_over_default() {
    let out = rewrite("https://amzn.to/abc", LinkMethod::Amazon, &config(), Some("cookbooks"));
    assert_eq!(out, "https://amzn.to/abc?tag=cook-21");
}

#[test]
fn skimlinks_wraps_encoded_url() {
    let out = rewrite(
        "https://www.barnesandnoble.com/w/x",
        LinkMethod::Skimlinks,
        &config(),
        None,
    );
    assert_eq!(
        out,
        "https://go.redirectingat.com/?id=102394X1592384&url=https%3A%2F%2Fwww.barnesandnoble.com%2Fw%2Fx"
    );
}

#[test]
fn skimlinks_without_id_returns_url_unchanged() {
    let config = RouterConfig::builder("site-20").build().unwrap();
    let url = "https://shop.example.com/item";
    assert_eq!(rewrite(url, LinkMethod::Skimlinks, &config, None), url);
}

#[test]
fn passthrough_and_skipped_are_unchanged() {
    let config = config();
    for method in [LinkMethod::Passthrough, LinkMethod::Skipped] {
        assert_eq!(rewrite("mailto:a@b.com", method, &config, None), "mailto:a@b.com");
        assert_eq!(
            rewrite("https://example.com/a?b=c", method, &config, None),
            "https://example.com/a?b=c"
        );
    }
}

#[test]
fn other_params_keep_their_exact_encoding() {
    let out = set_amazon_tag("https://www.amazon.com/s?k=rust%20book&rh=n%3A283155&tag=old-20", "t-20");
    assert_eq!(out, "https://www.amazon.com/s?k=rust%20book&rh=n%3A283155&tag=t-20");
}

#[test]
fn decoded_ampersand_params_survive_tagging() {
    let out = set_amazon_tag("https://www.amazon.com/dp/B1?th=1&psc=1", "site-20");
    assert_eq!(out, "https://www.amazon.com/dp/B1?th=1&psc=1&tag=site-20");
}
