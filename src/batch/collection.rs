//! Collection definitions: built-in list and JSON file loading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::sanitize_component;

const SEARCH_BASE: &str = "https://www.chinchillas.com/search/search_results.cfm";

/// One named group of listings scraped into one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name; also the default directory name and file prefix.
    pub name: String,
    /// Seed search-results URL. Empty means the collection is skipped.
    #[serde(default)]
    pub url: String,
    /// Filename prefix; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Output directory; defaults to `<root>/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Image count observed on a previous full run, for reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<u32>,
}

impl Collection {
    /// Creates a collection with default prefix and directory.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            prefix: None,
            output_dir: None,
            expected: None,
        }
    }

    /// Sets the expected image count.
    #[must_use]
    pub fn with_expected(mut self, expected: u32) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Filename prefix for output images.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }

    /// Output directory under `output_root`. An explicit absolute
    /// `output_dir` is used as is; a relative one is joined to the root.
    /// Without one, the sanitized name is the directory component.
    #[must_use]
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => output_root.join(dir),
            None => output_root.join(sanitize_component(&self.name)),
        }
    }

    /// Whether the collection has a seed URL to scrape.
    #[must_use]
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

fn title_search(term: &str) -> String {
    format!(
        "{SEARCH_BASE}?search_text={term}&search_type=title_search&search_limit=all&phrase_match=all&sort_order=desc"
    )
}

/// The five chinchilla colour varieties scraped by `harvester batch`.
#[must_use]
pub fn default_collections() -> Vec<Collection> {
    vec![
        Collection::new("standard", title_search("standard")).with_expected(919),
        Collection::new("white", title_search("white")).with_expected(964),
        Collection::new("black_velvet", title_search("black+velvet")).with_expected(374),
        Collection::new("beige", title_search("beige")).with_expected(477),
        Collection::new(
            "pink_white",
            format!(
                "{SEARCH_BASE}?search_type=title_search&search_name=Title%2B&%2BDescription%2BSearch&search_text=pink&phrase_match=any&category=-1&search_span=title&search_limit=all&country_type=in&country=&order_by=title&sort_order=DESC"
            ),
        )
        .with_expected(178),
    ]
}

/// Errors loading a collections file.
#[derive(Debug, Error)]
pub enum CollectionsError {
    /// The file could not be read.
    #[error("cannot read collections file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of collections.
    #[error("invalid collections file {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but its content is unusable.
    #[error("invalid collections file {path}: {reason}")]
    Invalid {
        /// File path.
        path: PathBuf,
        /// What is wrong.
        reason: String,
    },
}

/// Loads collections from a JSON array of `{ "name", "url", "prefix"?, "output_dir"? }`.
///
/// # Errors
///
/// Returns [`CollectionsError`] when the file cannot be read or parsed, is
/// empty, or contains blank or duplicate names.
pub fn load_collections(path: &Path) -> Result<Vec<Collection>, CollectionsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CollectionsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_collections(&raw).map_err(|error| match error {
        ParseFailure::Json(source) => CollectionsError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(reason) => CollectionsError::Invalid {
            path: path.to_path_buf(),
            reason,
        },
    })
}

enum ParseFailure {
    Json(serde_json::Error),
    Invalid(String),
}

fn parse_collections(raw: &str) -> Result<Vec<Collection>, ParseFailure> {
    let collections: Vec<Collection> = serde_json::from_str(raw).map_err(ParseFailure::Json)?;
    if collections.is_empty() {
        return Err(ParseFailure::Invalid("no collections defined".to_string()));
    }

    let mut names = HashSet::new();
    for (index, collection) in collections.iter().enumerate() {
        let name = collection.name.trim();
        if name.is_empty() {
            return Err(ParseFailure::Invalid(format!(
                "collection #{} has an empty name",
                index + 1
            )));
        }
        if !names.insert(name.to_string()) {
            return Err(ParseFailure::Invalid(format!(
                "duplicate collection name '{name}'"
            )));
        }
    }
    Ok(collections)
}
