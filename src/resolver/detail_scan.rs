//! Detail-page scan: pick the listing's own photos out of every `<img>` on its page.
//!
//! A source matches when it contains the item id under one of the known
//! photo directories, or anywhere at all, and is not a thumbnail. A detail
//! page can legitimately hold several photos of one listing; all of them are
//! returned, first occurrence kept.

use std::collections::HashSet;

use tracing::trace;
use url::Url;

use super::{ImageCandidate, THUMBNAIL_PATH_MARKER};
use crate::item::ItemId;
use crate::page::{ParsedPage, resolve_link};

/// Directories the site has stored full-size photos under, in match order.
pub const PHOTO_DIRECTORIES: [&str; 4] = ["/images/", "/photos/", "/uploads/", "/pics/"];

/// How a source string was tied to the item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `/<dir>/<id>` with `<dir>` one of [`PHOTO_DIRECTORIES`].
    PhotoDirectory(&'static str),
    /// The id appears somewhere else in the source.
    BareId,
}

/// Classifies one `<img src>` against the item id.
///
/// Returns `None` for thumbnails and for sources not mentioning the id.
#[must_use]
pub fn match_source(src: &str, item: &ItemId) -> Option<MatchKind> {
    if src.contains(THUMBNAIL_PATH_MARKER) {
        return None;
    }
    let id = item.as_str();
    PHOTO_DIRECTORIES
        .iter()
        .find(|dir| src.contains(&format!("{dir}{id}")))
        .map(|dir| MatchKind::PhotoDirectory(*dir))
        .or_else(|| src.contains(id).then_some(MatchKind::BareId))
}

/// Every distinct matching image on a detail page, resolved against `page_url`.
#[must_use]
pub fn matching_images(page: &ParsedPage, page_url: &Url, item: &ItemId) -> Vec<ImageCandidate> {
    let mut seen = HashSet::new();
    page.image_sources
        .iter()
        .filter_map(|src| {
            let kind = match_source(src, item)?;
            let url = resolve_link(src, page_url)?;
            trace!(src = %src, ?kind, "image matches item");
            Some(url)
        })
        .filter(|url| seen.insert(url.as_str().to_string()))
        .map(|url| ImageCandidate::new(item.clone(), url))
        .collect()
}
