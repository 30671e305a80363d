//! HTML page parsing into the handful of facts the pipeline needs.
//!
//! `scraper::Html` is not `Send`, so parsing is kept synchronous and the
//! result is reduced to owned data before any await point.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

/// Compiles a CSS selector at static init; panics on invalid pattern.
fn compile_static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector '{css}': {e}"))
}

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a[href]"));
static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("img[src]"));

/// A hyperlink with its raw target and trimmed visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The raw `href` attribute, unresolved.
    pub href: String,
    /// Visible text with surrounding whitespace removed.
    pub text: String,
}

/// Anchors and image sources of one HTML document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Every `<a href>` in the document.
    pub anchors: Vec<Anchor>,
    /// The `src` of every `<img src>` in the document.
    pub image_sources: Vec<String>,
}

impl ParsedPage {
    /// Parses raw response bytes. Invalid UTF-8 is replaced, never rejected.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        Self::parse_str(&String::from_utf8_lossy(body))
    }

    /// Parses an HTML string.
    #[must_use]
    pub fn parse_str(html: &str) -> Self {
        let document = Html::parse_document(html);

        let anchors = document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| {
                let href = element.value().attr("href")?.trim();
                Some(Anchor {
                    href: href.to_string(),
                    text: visible_text(element.text()),
                })
            })
            .collect();

        let image_sources = document
            .select(&IMAGE_SELECTOR)
            .filter_map(|element| element.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .collect();

        Self {
            anchors,
            image_sources,
        }
    }
}

/// Resolves a possibly relative link against the page it was found on.
///
/// Protocol-relative `//host/path` links inherit the base scheme. Only
/// `http`/`https` targets are returned; `javascript:`, `mailto:` and friends
/// yield `None`.
#[must_use]
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Concatenates text nodes with each fragment trimmed and no separator, so
/// `Ne<b>xt</b> &gt;` reads as `Next>`.
fn visible_text<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments.map(str::trim).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collects_anchors_in_document_order() {
        let page = ParsedPage::parse_str(
            r#"<html><body>
                <a href="/one">First</a>
                <a>no target</a>
                <a href=" /two "> <b>Second</b> link </a>
            </body></html>"#,
        );
        assert_eq!(
            page.anchors,
            vec![
                Anchor {
                    href: "/one".to_string(),
                    text: "First".to_string(),
                },
                Anchor {
                    href: "/two".to_string(),
                    text: "Secondlink".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_anchor_text_split_by_markup_is_concatenated() {
        let page = ParsedPage::parse_str(r#"<a href="/p2">Ne<b>xt</b> &gt;</a>"#);
        assert_eq!(page.anchors[0].text, "Next>");
    }

    #[test]
    fn test_parse_collects_image_sources_skipping_empty() {
        let page = ParsedPage::parse_str(
            r#"<img src="/images/1.jpg"><img src=""><img alt="x"><img src="/thumbs/1.jpg">"#,
        );
        assert_eq!(page.image_sources, vec!["/images/1.jpg", "/thumbs/1.jpg"]);
    }

    #[test]
    fn test_parse_tolerates_invalid_utf8() {
        let mut body = b"<a href=\"/next\">Next ".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"</a>");
        let page = ParsedPage::parse(&body);
        assert_eq!(page.anchors.len(), 1);
        assert!(page.anchors[0].text.starts_with("Next"));
    }

    #[test]
    fn test_resolve_link_relative_and_absolute() {
        let base = Url::parse("https://example.com/search/results.cfm?page=1").unwrap();
        assert_eq!(
            resolve_link("/listings/details/index.cfm?itemnum=5", &base)
                .unwrap()
                .as_str(),
            "https://example.com/listings/details/index.cfm?itemnum=5"
        );
        assert_eq!(
            resolve_link("results.cfm?page=2", &base).unwrap().as_str(),
            "https://example.com/search/results.cfm?page=2"
        );
        assert_eq!(
            resolve_link("http://other.example.org/x", &base)
                .unwrap()
                .as_str(),
            "http://other.example.org/x"
        );
        assert_eq!(
            resolve_link("//cdn.example.com/images/5.jpg", &base)
                .unwrap()
                .as_str(),
            "https://cdn.example.com/images/5.jpg"
        );
    }

    #[test]
    fn test_resolve_link_rejects_non_http_targets() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(resolve_link("javascript:void(0)", &base).is_none());
        assert!(resolve_link("mailto:seller@example.com", &base).is_none());
        assert!(resolve_link("   ", &base).is_none());
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(ParsedPage::parse(b""), ParsedPage::default());
    }
}
