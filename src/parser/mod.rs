//! Parser module for extracting structured data from HTML
//!
//! This is the extraction-and-normalization engine. Each logical field is
//! described by an ordered table of [`Rule`]s (primary selector first, then
//! fallbacks); one shared routine evaluates a table and the first rule that
//! produces a non-empty trimmed value wins. A field whose table is exhausted
//! takes its documented default from `models::defaults`, so adding a fallback
//! for markup drift is a data change, not a control-flow change.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::models::{defaults, AnimeDetail, AnimeSummary, SuggestionEntry};

/// Errors that can occur while extracting records from a fetched page
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The page layout matched none of the fallback rules
    #[error("Page layout did not match any extraction rule")]
    ScrapeFailed,

    /// The page parsed but yielded zero usable records
    #[error("No results found")]
    NoResultsFound,
}

/// How a rule pulls its value out of a matched element
#[derive(Debug, Clone, Copy)]
pub enum Capture {
    /// Collected text content, trimmed
    Text,
    /// A named attribute value, trimmed
    Attr(&'static str),
}

/// One extraction rule: a CSS selector plus a retrieval method
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// CSS selector evaluated inside the current scope
    pub selector: &'static str,
    /// Retrieval method applied to the first matching elements
    pub capture: Capture,
}

const fn text(selector: &'static str) -> Rule {
    Rule {
        selector,
        capture: Capture::Text,
    }
}

const fn attr(selector: &'static str, name: &'static str) -> Rule {
    Rule {
        selector,
        capture: Capture::Attr(name),
    }
}

// Detail-page field tables. Fallback depth differs per field; the poster
// cascades from the dedicated image through a container-scoped image down
// to the og:image meta tag.
const ENGLISH_NAME_RULES: &[Rule] = &[
    text("div.infotitle"),
    text("h1.entry-title"),
    attr("meta[property=\"og:title\"]", "content"),
];

const JAPANESE_NAME_RULES: &[Rule] = &[text("div.infotitlejp"), text("span.alternate")];

const SUMMARY_RULES: &[Rule] = &[
    text("div.infodes"),
    text("div.infodes2"),
    attr("meta[property=\"og:description\"]", "content"),
];

const POSTER_RULES: &[Rule] = &[
    attr("img.posterimg", "src"),
    attr("img.posterimg", "data-src"),
    attr("div.infoposter img", "src"),
    attr("meta[property=\"og:image\"]", "content"),
];

const EPISODE_COUNT_RULES: &[Rule] = &[text("div.infoepboxmain"), text("div.infoepisode")];

const YEAR_RULES: &[Rule] = &[text("div.infoyear"), text("div.infoyear2")];

const RATING_RULES: &[Rule] = &[text("div.infoscore"), text("div.inforating")];

// Listing-page field tables, evaluated per item block.
const LIST_NAME_RULES: &[Rule] = &[text("div.charttitle a")];

const LIST_LINK_RULES: &[Rule] = &[attr("div.charttitle a", "href"), attr("a", "href")];

const LIST_IMAGE_RULES: &[Rule] = &[
    attr("img.chartimg", "src"),
    attr("img.chartimg", "data-src"),
    attr("img", "src"),
];

const LIST_JAPANESE_RULES: &[Rule] = &[text("div.charttitlejp")];

const LIST_TIME_RULES: &[Rule] = &[text("div.charttime")];

/// Evaluate an ordered rule table against a scope; first non-empty match wins
fn first_match(scope: ElementRef<'_>, rules: &[Rule]) -> Option<String> {
    for rule in rules {
        let selector = Selector::parse(rule.selector).unwrap();
        for element in scope.select(&selector) {
            let value = match rule.capture {
                Capture::Text => element.text().collect::<String>().trim().to_string(),
                Capture::Attr(name) => element
                    .value()
                    .attr(name)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            };
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Evaluate a rule table, applying the field's documented default on exhaustion
fn field_or(scope: ElementRef<'_>, rules: &[Rule], default: &str) -> String {
    first_match(scope, rules).unwrap_or_else(|| default.to_string())
}

/// Resolve a possibly-relative scraped path against the source-site origin
///
/// Scheme-prefixed input is returned unchanged. No percent-encoding or
/// validation is performed; callers pass already-scraped values as-is.
pub fn absolute_url(path: &str, origin: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

/// Derive an id from a detail link's query fragment
///
/// "anime.php?one-piece" yields "one-piece"; a link without a query fragment
/// yields "unknown".
fn extract_id_from_href(href: &str) -> String {
    href.split('?')
        .nth(1)
        .filter(|id| !id.is_empty())
        .unwrap_or(defaults::UNKNOWN_ID)
        .to_string()
}

/// Parse one detail page into an [`AnimeDetail`]
///
/// Record-level validation: when the raw name, synopsis and poster lookups
/// all miss, the page layout matched no rule at all and the extraction fails
/// as [`ParseError::ScrapeFailed`] rather than producing a placeholder-only
/// record. A real anime merely lacking a synopsis still extracts.
pub fn parse_anime_detail(html: &str, origin: &str) -> Result<AnimeDetail, ParseError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let english_name = first_match(root, ENGLISH_NAME_RULES);
    let summary = first_match(root, SUMMARY_RULES);
    let poster = first_match(root, POSTER_RULES);

    if english_name.is_none() && summary.is_none() && poster.is_none() {
        return Err(ParseError::ScrapeFailed);
    }

    let tags_selector = Selector::parse("div.infotags a").unwrap();
    let tags_fallback_selector = Selector::parse("div.boxitem").unwrap();

    let mut tags: Vec<String> = document
        .select(&tags_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        tags = document
            .select(&tags_fallback_selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
    }
    if tags.is_empty() {
        tags.push(defaults::UNKNOWN.to_string());
    }

    Ok(AnimeDetail {
        english_name: english_name.unwrap_or_else(|| defaults::TITLE_MISSING.to_string()),
        japanese_name: field_or(root, JAPANESE_NAME_RULES, defaults::JAPANESE_MISSING),
        summary: summary.unwrap_or_else(|| defaults::SUMMARY_MISSING.to_string()),
        poster: poster
            .map(|src| absolute_url(&src, origin))
            .unwrap_or_default(),
        episodes: field_or(root, EPISODE_COUNT_RULES, defaults::UNKNOWN),
        year: field_or(root, YEAR_RULES, defaults::UNKNOWN),
        rating: field_or(root, RATING_RULES, defaults::UNKNOWN),
        tags,
    })
}

/// Parse a listing page (new releases, popular) into summaries
///
/// Item blocks without a non-empty name are silently dropped; a name-less
/// entry is not actionable. An empty result distinguishes "site reachable
/// but empty" from "site unreachable" as [`ParseError::NoResultsFound`].
pub fn parse_anime_list(html: &str, origin: &str) -> Result<Vec<AnimeSummary>, ParseError> {
    let document = Html::parse_document(html);
    let block_selector = Selector::parse("div.chart").unwrap();

    let mut items = Vec::new();

    for block in document.select(&block_selector) {
        let Some(english_name) = first_match(block, LIST_NAME_RULES) else {
            continue;
        };
        let href = first_match(block, LIST_LINK_RULES).unwrap_or_default();

        items.push(AnimeSummary {
            id: extract_id_from_href(&href),
            link: absolute_url(&href, origin),
            image: first_match(block, LIST_IMAGE_RULES)
                .map(|src| absolute_url(&src, origin))
                .unwrap_or_else(|| defaults::PLACEHOLDER_IMAGE.to_string()),
            english_name,
            japanese_name: field_or(block, LIST_JAPANESE_RULES, defaults::JAPANESE_MISSING),
            time: field_or(block, LIST_TIME_RULES, defaults::UNKNOWN),
        });
    }

    if items.is_empty() {
        return Err(ParseError::NoResultsFound);
    }
    Ok(items)
}

/// Parse the popular page into suggestion entries
///
/// Relaxed variant of the list extraction: when no dedicated title link
/// exists the name falls back to the block's text. Entries are filtered to
/// those carrying both a name and a link.
pub fn parse_suggestions(html: &str, origin: &str) -> Result<Vec<SuggestionEntry>, ParseError> {
    let document = Html::parse_document(html);
    let block_selector = Selector::parse("div.chart").unwrap();

    let mut entries = Vec::new();

    for block in document.select(&block_selector) {
        let name = first_match(block, LIST_NAME_RULES).or_else(|| {
            let fallback = block.text().collect::<String>().trim().to_string();
            (!fallback.is_empty()).then_some(fallback)
        });
        let link = first_match(block, LIST_LINK_RULES);

        let (Some(english_name), Some(href)) = (name, link) else {
            continue;
        };

        entries.push(SuggestionEntry {
            image: first_match(block, LIST_IMAGE_RULES)
                .map(|src| absolute_url(&src, origin))
                .unwrap_or_else(|| defaults::PLACEHOLDER_IMAGE.to_string()),
            english_name,
            japanese_name: field_or(block, LIST_JAPANESE_RULES, defaults::JAPANESE_MISSING),
            link: absolute_url(&href, origin),
        });
    }

    if entries.is_empty() {
        return Err(ParseError::NoResultsFound);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORIGIN: &str = "https://animeheaven.me";

    #[test]
    fn test_absolute_url_passes_through_absolute() {
        let url = "https://cdn.example.com/poster.jpg";
        assert_eq!(absolute_url(url, ORIGIN), url);
        assert_eq!(
            absolute_url("http://cdn.example.com/a.jpg", ORIGIN),
            "http://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn test_absolute_url_joins_rooted_path() {
        assert_eq!(
            absolute_url("/cover/1.jpg", ORIGIN),
            "https://animeheaven.me/cover/1.jpg"
        );
    }

    #[test]
    fn test_absolute_url_joins_bare_path() {
        assert_eq!(
            absolute_url("anime.php?one-piece", ORIGIN),
            "https://animeheaven.me/anime.php?one-piece"
        );
    }

    proptest! {
        // Normalizing the same path twice against the same origin is
        // idempotent: the first pass yields an absolute URL, which the
        // second pass returns unchanged.
        #[test]
        fn prop_absolute_url_idempotent(path in "[a-z0-9/._?=-]{0,40}") {
            let once = absolute_url(&path, ORIGIN);
            let twice = absolute_url(&once, ORIGIN);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_absolute_url_always_absolute(path in "[a-z0-9/._?=-]{0,40}") {
            let resolved = absolute_url(&path, ORIGIN);
            prop_assert!(resolved.starts_with("http://") || resolved.starts_with("https://"));
        }
    }

    #[test]
    fn test_extract_id_from_href() {
        assert_eq!(extract_id_from_href("anime.php?one-piece"), "one-piece");
        assert_eq!(extract_id_from_href("/anime.php?naruto"), "naruto");
        assert_eq!(extract_id_from_href("/anime/naruto"), "unknown");
        assert_eq!(extract_id_from_href("anime.php?"), "unknown");
        assert_eq!(extract_id_from_href(""), "unknown");
    }

    fn detail_page() -> &'static str {
        r#"
        <html><body>
            <div class="info">
                <div class="infotitle">Cowboy Bebop</div>
                <div class="infotitlejp">カウボーイビバップ</div>
                <img class="posterimg" src="/cover/bebop.jpg" />
                <div class="infodes">Bounty hunters drift through space.</div>
                <div class="infoepboxmain">26</div>
                <div class="infoyear">1998</div>
                <div class="infoscore">8.8</div>
                <div class="infotags">
                    <a href="/tag/action">Action</a>
                    <a href="/tag/scifi">Sci-Fi</a>
                </div>
            </div>
        </body></html>
        "#
    }

    #[test]
    fn test_parse_anime_detail_primary_markup() {
        let detail = parse_anime_detail(detail_page(), ORIGIN).unwrap();

        assert_eq!(detail.english_name, "Cowboy Bebop");
        assert_eq!(detail.japanese_name, "カウボーイビバップ");
        assert_eq!(detail.summary, "Bounty hunters drift through space.");
        assert_eq!(detail.poster, "https://animeheaven.me/cover/bebop.jpg");
        assert_eq!(detail.episodes, "26");
        assert_eq!(detail.year, "1998");
        assert_eq!(detail.rating, "8.8");
        assert_eq!(detail.tags, vec!["Action", "Sci-Fi"]);
    }

    #[test]
    fn test_parse_anime_detail_poster_meta_fallback() {
        let html = r#"
        <html><head>
            <meta property="og:image" content="https://cdn.example.com/fallback.jpg" />
        </head><body>
            <div class="infotitle">Trigun</div>
        </body></html>
        "#;

        let detail = parse_anime_detail(html, ORIGIN).unwrap();
        assert_eq!(detail.poster, "https://cdn.example.com/fallback.jpg");
        assert!(detail.poster.starts_with("https://"));
    }

    #[test]
    fn test_parse_anime_detail_title_fallback_chain() {
        let html = r#"
        <html><body>
            <h1 class="entry-title">Monster</h1>
            <div class="infodes">A doctor's choice.</div>
        </body></html>
        "#;

        let detail = parse_anime_detail(html, ORIGIN).unwrap();
        assert_eq!(detail.english_name, "Monster");
    }

    #[test]
    fn test_parse_anime_detail_applies_defaults() {
        // Name present, everything else missing: a sparse record, not a
        // layout mismatch.
        let html = r#"<html><body><div class="infotitle">Obscure OVA</div></body></html>"#;
        let detail = parse_anime_detail(html, ORIGIN).unwrap();

        assert_eq!(detail.english_name, "Obscure OVA");
        assert_eq!(detail.japanese_name, defaults::JAPANESE_MISSING);
        assert_eq!(detail.summary, defaults::SUMMARY_MISSING);
        assert_eq!(detail.poster, "");
        assert_eq!(detail.episodes, defaults::UNKNOWN);
        assert_eq!(detail.year, defaults::UNKNOWN);
        assert_eq!(detail.rating, defaults::UNKNOWN);
        assert_eq!(detail.tags, vec![defaults::UNKNOWN.to_string()]);
    }

    #[test]
    fn test_parse_anime_detail_layout_mismatch_fails() {
        let html = r#"<html><body><div class="unrelated">nothing here</div></body></html>"#;
        assert_eq!(
            parse_anime_detail(html, ORIGIN),
            Err(ParseError::ScrapeFailed)
        );
    }

    fn list_block(name: Option<&str>, href: &str) -> String {
        let title = name
            .map(|n| format!(r#"<div class="charttitle"><a href="{}">{}</a></div>"#, href, n))
            .unwrap_or_default();
        format!(
            r#"<div class="chart">
                {}
                <img class="chartimg" src="/thumb.jpg" />
                <div class="charttitlejp">日本語</div>
                <div class="charttime">3 hours ago</div>
            </div>"#,
            title
        )
    }

    #[test]
    fn test_parse_anime_list_drops_nameless_blocks() {
        let html = format!(
            "<html><body>{}{}{}{}{}</body></html>",
            list_block(Some("A"), "anime.php?a"),
            list_block(None, "anime.php?b"),
            list_block(Some("C"), "anime.php?c"),
            list_block(None, "anime.php?d"),
            list_block(Some("E"), "anime.php?e"),
        );

        let items = parse_anime_list(&html, ORIGIN).unwrap();
        assert_eq!(items.len(), 3);
        let names: Vec<&str> = items.iter().map(|i| i.english_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "E"]);
    }

    #[test]
    fn test_parse_anime_list_fields() {
        let html = format!("<html><body>{}</body></html>", list_block(Some("A"), "anime.php?a"));
        let items = parse_anime_list(&html, ORIGIN).unwrap();

        let item = &items[0];
        assert_eq!(item.id, "a");
        assert_eq!(item.link, "https://animeheaven.me/anime.php?a");
        assert_eq!(item.image, "https://animeheaven.me/thumb.jpg");
        assert_eq!(item.japanese_name, "日本語");
        assert_eq!(item.time, "3 hours ago");
    }

    #[test]
    fn test_parse_anime_list_placeholder_image() {
        let html = r#"
        <html><body><div class="chart">
            <div class="charttitle"><a href="anime.php?x">X</a></div>
        </div></body></html>
        "#;
        let items = parse_anime_list(html, ORIGIN).unwrap();
        assert_eq!(items[0].image, defaults::PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_parse_anime_list_empty_is_failure() {
        let html = "<html><body><div class='listing'></div></body></html>";
        assert_eq!(
            parse_anime_list(html, ORIGIN),
            Err(ParseError::NoResultsFound)
        );
    }

    #[test]
    fn test_parse_suggestions_relaxed_name_fallback() {
        // No dedicated title link: the name falls back to the block text,
        // while the link comes from the generic anchor rule.
        let html = r#"
        <html><body><div class="chart">
            <a href="anime.php?hidden-gem"><img class="chartimg" src="/g.jpg" />Hidden Gem</a>
        </div></body></html>
        "#;

        let entries = parse_suggestions(html, ORIGIN).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].english_name, "Hidden Gem");
        assert_eq!(entries[0].link, "https://animeheaven.me/anime.php?hidden-gem");
    }

    #[test]
    fn test_parse_suggestions_requires_link() {
        let html = r#"
        <html><body><div class="chart"><span>Linkless entry</span></div></body></html>
        "#;
        assert_eq!(
            parse_suggestions(html, ORIGIN),
            Err(ParseError::NoResultsFound)
        );
    }
}
