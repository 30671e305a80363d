//! Acceptance thresholds and composite-split settings.

use std::fmt;
use std::str::FromStr;

/// Height of one photo inside a vertically stacked composite.
pub const DEFAULT_TILE_HEIGHT: u32 = 600;

/// Minimum width and height of a tile cut from a composite.
pub const DEFAULT_MIN_TILE_SIDE: u32 = 400;

/// When and how to cut a stacked composite into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    /// A composite's height must be an exact multiple (at least 2) of this.
    pub tile_height: u32,
    /// Tiles narrower than this are dropped.
    pub min_tile_width: u32,
    /// Tiles shorter than this are dropped.
    pub min_tile_height: u32,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            tile_height: DEFAULT_TILE_HEIGHT,
            min_tile_width: DEFAULT_MIN_TILE_SIDE,
            min_tile_height: DEFAULT_MIN_TILE_SIDE,
        }
    }
}

impl SplitPolicy {
    /// Number of tiles an image of `height` splits into, or `None` when it
    /// is not a stack of at least two whole tiles.
    #[must_use]
    pub fn tile_count(&self, height: u32) -> Option<u32> {
        if self.tile_height == 0 || height % self.tile_height != 0 {
            return None;
        }
        let count = height / self.tile_height;
        (count >= 2).then_some(count)
    }

    /// Whether a tile of this size is kept.
    #[must_use]
    pub fn accepts_tile(&self, width: u32, height: u32) -> bool {
        width >= self.min_tile_width && height >= self.min_tile_height
    }
}

/// Named acceptance presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptancePreset {
    /// 100×100 minimum, any file size.
    Lenient,
    /// 150×150 minimum and at least 10 000 bytes downloaded.
    #[default]
    Strict,
}

impl AcceptancePreset {
    /// Returns the stable string label used in config files and on the CLI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for AcceptancePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcceptancePreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown acceptance preset '{other}' (expected 'lenient' or 'strict')"
            )),
        }
    }
}

/// Decides which downloaded images are worth keeping.
///
/// Pure data: the same bytes under the same policy always produce the same
/// verdict and tile count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptancePolicy {
    /// Minimum decoded width in pixels.
    pub min_width: u32,
    /// Minimum decoded height in pixels.
    pub min_height: u32,
    /// Minimum size of the downloaded body in bytes.
    pub min_bytes: usize,
    /// Composite splitting; `None` keeps every image whole.
    pub split: Option<SplitPolicy>,
}

impl AcceptancePolicy {
    /// 100×100 minimum, no byte floor, no splitting.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            min_bytes: 0,
            split: None,
        }
    }

    /// 150×150 minimum and 10 000 bytes, no splitting.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_width: 150,
            min_height: 150,
            min_bytes: 10_000,
            split: None,
        }
    }

    /// Builds the policy for a preset.
    #[must_use]
    pub fn from_preset(preset: AcceptancePreset) -> Self {
        match preset {
            AcceptancePreset::Lenient => Self::lenient(),
            AcceptancePreset::Strict => Self::strict(),
        }
    }

    /// Enables composite splitting with the given tile settings.
    #[must_use]
    pub fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = Some(split);
        self
    }

    /// Disables composite splitting.
    #[must_use]
    pub fn without_split(mut self) -> Self {
        self.split = None;
        self
    }
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self::strict().with_split(SplitPolicy::default())
    }
}
