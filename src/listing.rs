//! Listing discovery on search-result pages.
//!
//! A search-result page yields two things: the detail pages it links to and,
//! optionally, the next page of results. The next-page heuristic is the
//! site's long-standing convention: the first anchor, in document order,
//! whose visible text contains "next" (case-insensitive).

use std::collections::HashSet;

use tracing::debug;
use url::Url;

use crate::item::ItemId;
use crate::page::{ParsedPage, resolve_link};

/// Path fragment every detail-page link contains.
pub const DEFAULT_DETAIL_PATH_MARKER: &str = "/listings/details/";

/// Word an anchor's visible text must contain to count as the next-page link.
pub const DEFAULT_NEXT_LINK_WORD: &str = "next";

/// URL conventions of the listing site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConventions {
    /// Path fragment identifying detail-page links.
    pub detail_path_marker: String,
    /// Lowercase word identifying the next-page anchor text.
    pub next_link_word: String,
}

impl Default for SiteConventions {
    fn default() -> Self {
        Self {
            detail_path_marker: DEFAULT_DETAIL_PATH_MARKER.to_string(),
            next_link_word: DEFAULT_NEXT_LINK_WORD.to_string(),
        }
    }
}

/// What one search-result page points to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Distinct absolute detail-page URLs, in document order.
    pub detail_urls: Vec<Url>,
    /// Thumbnail item ids found in `<img>` sources, distinct, in document order.
    pub thumbnail_ids: Vec<ItemId>,
    /// The next search-result page, if the page links to one.
    pub next_url: Option<Url>,
}

/// Mines a parsed search-result page for detail links, thumbnail ids and the
/// next-page link. Relative links resolve against `page_url`.
#[must_use]
pub fn discover_listings(
    page: &ParsedPage,
    page_url: &Url,
    conventions: &SiteConventions,
) -> ListingPage {
    let listing = ListingPage {
        detail_urls: detail_urls(page, page_url, conventions),
        thumbnail_ids: thumbnail_ids(page),
        next_url: next_page_url(page, page_url, conventions),
    };
    debug!(
        page = %page_url,
        details = listing.detail_urls.len(),
        thumbnails = listing.thumbnail_ids.len(),
        has_next = listing.next_url.is_some(),
        "discovered listings"
    );
    listing
}

/// Detail-page links: href contains the detail marker and carries a numeric
/// `itemnum`. Duplicates on the same page are dropped.
#[must_use]
pub fn detail_urls(page: &ParsedPage, page_url: &Url, conventions: &SiteConventions) -> Vec<Url> {
    let mut seen = HashSet::new();
    page.anchors
        .iter()
        .filter(|anchor| anchor.href.contains(&conventions.detail_path_marker))
        .filter_map(|anchor| resolve_link(&anchor.href, page_url))
        .filter(|url| ItemId::from_detail_url(url).is_some())
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Item ids of `/thumbs/<id>.jpg` images, first occurrence kept.
#[must_use]
pub fn thumbnail_ids(page: &ParsedPage) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    page.image_sources
        .iter()
        .filter_map(|src| ItemId::from_thumbnail_src(src))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// First anchor whose trimmed, lowercased text contains the next-link word.
///
/// Substring match: "Next", "Next >" and "next page" all qualify, and so
/// does "Nextel".
#[must_use]
pub fn next_page_url(page: &ParsedPage, page_url: &Url, conventions: &SiteConventions) -> Option<Url> {
    let word = conventions.next_link_word.to_lowercase();
    let anchor = page
        .anchors
        .iter()
        .find(|anchor| anchor.text.trim().to_lowercase().contains(&word))?;
    resolve_link(&anchor.href, page_url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://www.chinchillas.com/search/search_results.cfm?search_text=white")
            .unwrap()
    }

    fn discover(html: &str) -> ListingPage {
        discover_listings(
            &ParsedPage::parse_str(html),
            &page_url(),
            &SiteConventions::default(),
        )
    }

    #[test]
    fn test_detail_urls_resolved_deduplicated_in_order() {
        let listing = discover(
            r#"
            <a href="/listings/details/index.cfm?itemnum=200">B</a>
            <a href="/listings/details/index.cfm?itemnum=100">A</a>
            <a href="/listings/details/index.cfm?itemnum=200"><img src="/thumbs/200.jpg"></a>
            <a href="/about.cfm">About</a>
            "#,
        );
        let urls: Vec<&str> = listing.detail_urls.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.chinchillas.com/listings/details/index.cfm?itemnum=200",
                "https://www.chinchillas.com/listings/details/index.cfm?itemnum=100",
            ]
        );
    }

    #[test]
    fn test_detail_urls_require_numeric_item_number() {
        let listing = discover(
            r#"
            <a href="/listings/details/index.cfm">no id</a>
            <a href="/listings/details/index.cfm?itemnum=">empty</a>
            <a href="/listings/details/index.cfm?itemnum=7">ok</a>
            "#,
        );
        assert_eq!(listing.detail_urls.len(), 1);
    }

    #[test]
    fn test_next_url_first_match_wins() {
        let listing = discover(
            r#"
            <a href="?page=1">Previous</a>
            <a href="?page=2">  Next &gt; </a>
            <a href="?page=3">next</a>
            "#,
        );
        assert_eq!(
            listing.next_url.unwrap().as_str(),
            "https://www.chinchillas.com/search/search_results.cfm?page=2"
        );
    }

    #[test]
    fn test_next_url_case_insensitive_substring() {
        let listing = discover(r#"<a href="/p/2">NEXT PAGE</a>"#);
        assert_eq!(
            listing.next_url.unwrap().as_str(),
            "https://www.chinchillas.com/p/2"
        );
    }

    #[test]
    fn test_next_url_found_when_text_split_by_markup() {
        let listing = discover(r#"<a href="?page=2">Ne<b>xt</b> &gt;</a>"#);
        assert_eq!(
            listing.next_url.unwrap().as_str(),
            "https://www.chinchillas.com/search/search_results.cfm?page=2"
        );
    }

    #[test]
    fn test_next_url_absent_when_no_anchor_mentions_next() {
        let listing = discover(r#"<a href="/p/2">2</a><a href="/p/3">More</a>"#);
        assert!(listing.next_url.is_none());
    }

    #[test]
    fn test_thumbnail_ids_distinct_in_order() {
        let listing = discover(
            r#"
            <img src="/thumbs/9.jpg"><img src="/images/logo.gif">
            <img src="/thumbs/3.jpg"><img src="/thumbs/9.jpg">
            "#,
        );
        let ids: Vec<&str> = listing.thumbnail_ids.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["9", "3"]);
    }

    #[test]
    fn test_custom_conventions() {
        let conventions = SiteConventions {
            detail_path_marker: "/ad/".to_string(),
            next_link_word: "weiter".to_string(),
        };
        let page = ParsedPage::parse_str(
            r#"<a href="/ad/view?itemnum=3">x</a><a href="/s?p=2">Weiter</a>"#,
        );
        let listing = discover_listings(&page, &page_url(), &conventions);
        assert_eq!(listing.detail_urls.len(), 1);
        assert!(listing.next_url.is_some());
    }
}
