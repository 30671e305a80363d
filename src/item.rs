//! Item identifiers: the numeric id that ties a listing to its photos.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// `/thumbs/<digits>.jpg` anywhere in an image source.
static THUMBNAIL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"/thumbs/(\d+)\.jpg"));

/// Query parameter carrying the listing number on detail URLs.
pub const ITEM_QUERY_KEY: &str = "itemnum";

/// Numeric identifier of one listing, as found in its detail URL or thumbnail name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Accepts a non-empty all-digit string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Self(value.to_string()))
    }

    /// Extracts the id from the `itemnum` query parameter of a detail URL.
    #[must_use]
    pub fn from_detail_url(url: &Url) -> Option<Self> {
        url.query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case(ITEM_QUERY_KEY))
            .and_then(|(_, value)| Self::parse(&value))
    }

    /// Extracts the id from a `/thumbs/<id>.jpg` image source.
    #[must_use]
    pub fn from_thumbnail_src(src: &str) -> Option<Self> {
        THUMBNAIL_ID_RE
            .captures(src)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Self::parse(m.as_str()))
    }

    /// The id digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
