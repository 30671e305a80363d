//! Reasons a downloaded body does not become an output image.

use thiserror::Error;

/// Post-processing verdict for a body that produced no images.
///
/// A rejection is an expected outcome, not a failure of the run.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The bytes are not an image in any supported format.
    #[error("not a decodable image: {source}")]
    Undecodable {
        /// The decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Decoded dimensions below the policy minimum.
    #[error("too small: {width}x{height} (minimum {min_width}x{min_height})")]
    TooSmall {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
        /// Policy minimum width.
        min_width: u32,
        /// Policy minimum height.
        min_height: u32,
    },

    /// Downloaded body smaller than the policy byte floor.
    #[error("too small: {bytes} bytes (minimum {min_bytes})")]
    TooFewBytes {
        /// Body size.
        bytes: usize,
        /// Policy minimum.
        min_bytes: usize,
    },

    /// The image was split but every tile failed the tile size gate.
    #[error("all {tiles} tiles below the minimum tile size")]
    NoTilesAccepted {
        /// Number of tiles cut.
        tiles: u32,
    },
}

impl Rejection {
    /// Creates an undecodable-image rejection.
    pub fn undecodable(source: image::ImageError) -> Self {
        Self::Undecodable { source }
    }
}
