//! Image post-processing: decode, normalize, gate, split and encode.
//!
//! [`prepare`] is a pure function of the downloaded bytes and the
//! [`AcceptancePolicy`]; it never touches the filesystem. Steps, in order:
//!
//! 1. decode (failure is a [`Rejection::Undecodable`]);
//! 2. normalize to 8-bit RGB;
//! 3. gate on minimum dimensions and minimum body size;
//! 4. if splitting is enabled and the height is an exact multiple (≥ 2) of
//!    the tile height, cut the image into equal horizontal bands;
//! 5. drop split tiles below the tile size gate.
//!
//! [`encode_jpeg`] turns each surviving image into a quality-95 JPEG.

mod error;
mod policy;

pub use error::Rejection;
pub use policy::{
    AcceptancePolicy, AcceptancePreset, DEFAULT_MIN_TILE_SIDE, DEFAULT_TILE_HEIGHT, SplitPolicy,
};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, RgbImage, imageops};

/// JPEG quality of every written image.
pub const JPEG_QUALITY: u8 = 95;

/// An accepted download, ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Decoded width of the source image.
    pub width: u32,
    /// Decoded height of the source image.
    pub height: u32,
    /// Size of the downloaded body.
    pub bytes: usize,
    /// One entry for a plain image, several for a split composite.
    pub tiles: Vec<RgbImage>,
}

impl PreparedImage {
    /// Whether the source was cut into more than one tile.
    #[must_use]
    pub fn was_split(&self) -> bool {
        self.tiles.len() > 1 || self.tiles.first().is_some_and(|t| t.height() != self.height)
    }
}

/// Decodes and vets a downloaded body.
///
/// # Errors
///
/// Returns a [`Rejection`] when the bytes are not an image, the image or body
/// is below the policy minimums, or every split tile is too small.
pub fn prepare(body: &[u8], policy: &AcceptancePolicy) -> Result<PreparedImage, Rejection> {
    let image = image::load_from_memory(body)
        .map_err(Rejection::undecodable)?
        .into_rgb8();
    let (width, height) = image.dimensions();

    if width < policy.min_width || height < policy.min_height {
        return Err(Rejection::TooSmall {
            width,
            height,
            min_width: policy.min_width,
            min_height: policy.min_height,
        });
    }
    if body.len() < policy.min_bytes {
        return Err(Rejection::TooFewBytes {
            bytes: body.len(),
            min_bytes: policy.min_bytes,
        });
    }

    let tiles = match policy.split {
        Some(split) => match split.tile_count(height) {
            Some(count) => split_tiles(&image, &split, count)?,
            None => vec![image],
        },
        None => vec![image],
    };

    Ok(PreparedImage {
        width,
        height,
        bytes: body.len(),
        tiles,
    })
}

fn split_tiles(image: &RgbImage, split: &SplitPolicy, count: u32) -> Result<Vec<RgbImage>, Rejection> {
    let width = image.width();
    let tiles: Vec<RgbImage> = (0..count)
        .map(|index| {
            imageops::crop_imm(image, 0, index * split.tile_height, width, split.tile_height)
                .to_image()
        })
        .filter(|tile| split.accepts_tile(tile.width(), tile.height()))
        .collect();

    if tiles.is_empty() {
        return Err(Rejection::NoTilesAccepted { tiles: count });
    }
    Ok(tiles)
}

/// Encodes an RGB image as a quality-95 JPEG.
///
/// # Errors
///
/// Returns the encoder error; not expected for in-memory RGB buffers.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY))?;
    Ok(buffer)
}
