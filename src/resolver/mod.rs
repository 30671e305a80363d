//! Image resolution: which URLs hold the full-resolution photo(s) of a listing.
//!
//! The site has no API and has used several image path schemes over the
//! years, so resolution is heuristic. Two strategies are available:
//!
//! - [`ResolveStrategy::DetailScan`] (default) visits the listing's detail
//!   page and keeps every `<img>` whose source mentions the item id outside
//!   a `/thumbs/` path. See [`detail_scan`].
//! - [`ResolveStrategy::PatternGuess`] skips the detail page and guesses
//!   full-size locations from a thumbnail id, trying each in turn. See
//!   [`pattern_guess`].

pub mod detail_scan;
pub mod pattern_guess;

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::item::ItemId;

/// Path segment that marks a thumbnail; thumbnails never count as a detail-scan match.
pub const THUMBNAIL_PATH_MARKER: &str = "/thumbs/";

/// How full-size images are located for each listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// Visit each detail page and scan its `<img>` tags.
    #[default]
    DetailScan,
    /// Guess full-size URLs from thumbnail ids on the search-result page.
    PatternGuess,
}

impl ResolveStrategy {
    /// Returns the stable string label used in config files and on the CLI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DetailScan => "detail-scan",
            Self::PatternGuess => "pattern-guess",
        }
    }
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "detail-scan" => Ok(Self::DetailScan),
            "pattern-guess" => Ok(Self::PatternGuess),
            other => Err(format!(
                "unknown strategy '{other}' (expected 'detail-scan' or 'pattern-guess')"
            )),
        }
    }
}

/// A URL that may hold a full-size image of one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// The listing the image belongs to.
    pub item: ItemId,
    /// Absolute image URL.
    pub url: Url,
}

impl ImageCandidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(item: ItemId, url: Url) -> Self {
        Self { item, url }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_default_is_detail_scan() {
        assert_eq!(ResolveStrategy::default(), ResolveStrategy::DetailScan);
    }

    #[test]
    fn test_strategy_labels_parse_back() {
        for strategy in [ResolveStrategy::DetailScan, ResolveStrategy::PatternGuess] {
            assert_eq!(strategy.as_str().parse::<ResolveStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_strategy_unknown_label_rejected() {
        let err = "guess".parse::<ResolveStrategy>().unwrap_err();
        assert!(err.contains("guess"), "Expected label in: {err}");
    }
}
