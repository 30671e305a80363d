//! Pattern guessing: derive full-size image URLs from a thumbnail id.
//!
//! Candidates are tried in template order by the driver; the first one that
//! downloads and passes acceptance wins. The thumbnail itself is the last
//! resort so a listing still yields something when no larger copy exists.

use url::Url;

use super::ImageCandidate;
use crate::item::ItemId;

/// Root-relative path templates, `{id}` replaced by the item id.
pub const DEFAULT_TEMPLATES: [&str; 3] = ["/images/{id}.jpg", "/uploads/{id}.jpg", "/thumbs/{id}.jpg"];

/// Builds the ordered candidate list for `item` against the site root of `site_url`.
#[must_use]
pub fn candidate_urls(site_url: &Url, item: &ItemId) -> Vec<ImageCandidate> {
    candidate_urls_with_templates(site_url, item, &DEFAULT_TEMPLATES)
}

/// Same as [`candidate_urls`] with caller-supplied templates.
#[must_use]
pub fn candidate_urls_with_templates(
    site_url: &Url,
    item: &ItemId,
    templates: &[&str],
) -> Vec<ImageCandidate> {
    templates
        .iter()
        .map(|template| template.replace("{id}", item.as_str()))
        .filter_map(|path| site_url.join(&path).ok())
        .map(|url| ImageCandidate::new(item.clone(), url))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_urls_default_order() {
        let site = Url::parse("https://www.chinchillas.com/search/search_results.cfm?x=1").unwrap();
        let item = ItemId::parse("555").unwrap();
        let urls: Vec<String> = candidate_urls(&site, &item)
            .into_iter()
            .map(|c| c.url.to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://www.chinchillas.com/images/555.jpg",
                "https://www.chinchillas.com/uploads/555.jpg",
                "https://www.chinchillas.com/thumbs/555.jpg",
            ]
        );
    }

    #[test]
    fn test_candidate_urls_custom_templates() {
        let site = Url::parse("http://127.0.0.1:8080/list").unwrap();
        let item = ItemId::parse("1").unwrap();
        let candidates = candidate_urls_with_templates(&site, &item, &["/big/{id}.png"]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url.as_str(), "http://127.0.0.1:8080/big/1.png");
        assert_eq!(candidates[0].item, item);
    }
}
