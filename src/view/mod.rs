//! Panoramic views and their preprocessing.
//!
//! A `RawImage` is whatever the image store hands back: an interleaved
//! buffer with one or three channels at any resolution. `preprocess` turns it
//! into a `PanoramicView`, a contiguous single-channel buffer at the fixed
//! matching resolution. Columns of a panoramic view span the horizontal field
//! of view, so a heading change is a circular shift of columns.

use crate::util::{HomingError, HomingResult};

#[cfg(feature = "image-io")]
pub mod io;
mod preprocess;
mod rotate;

pub use preprocess::{preprocess, to_grayscale};
pub use rotate::{column_shift, image_difference, rotate};

/// Default panorama width in pixels.
pub const DEFAULT_WIDTH: usize = 90;
/// Default panorama height in pixels.
pub const DEFAULT_HEIGHT: usize = 17;

/// Pixel layout of a raw image buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One intensity byte per pixel.
    Gray,
    /// Three interleaved bytes per pixel in R, G, B order.
    Rgb,
}

impl Channels {
    /// Returns the number of bytes per pixel.
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Decoded pixel data as returned by an image store.
#[derive(Clone, Debug, PartialEq)]
pub struct RawImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: Channels,
}

impl RawImage {
    /// Wraps an interleaved buffer, validating its length against the shape.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: Channels,
    ) -> HomingResult<Self> {
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(channels.count()))
            .ok_or(HomingError::InvalidShape { width, height })?;
        if needed == 0 || data.len() != needed {
            return Err(HomingError::InvalidShape { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Wraps a single-channel buffer.
    pub fn gray(data: Vec<u8>, width: usize, height: usize) -> HomingResult<Self> {
        Self::new(data, width, height, Channels::Gray)
    }

    /// Wraps an interleaved RGB buffer.
    pub fn rgb(data: Vec<u8>, width: usize, height: usize) -> HomingResult<Self> {
        Self::new(data, width, height, Channels::Rgb)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Resolution of the panoramic views used for matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Width in pixels; columns cover the full field of view.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Owned single-channel panorama at matching resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanoramicView {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl PanoramicView {
    /// Creates a view from a contiguous row-major intensity buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> HomingResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(HomingError::InvalidShape { width, height })?;
        if needed == 0 || data.len() != needed {
            return Err(HomingError::InvalidShape { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of pixels in the view.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: zero-area views cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the backing row-major buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns row `y`, or `None` when out of range.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Iterates over rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.width)
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.row(y).and_then(|row| row.get(x)).copied()
    }

    pub(crate) fn ensure_same_shape(&self, other: &PanoramicView) -> HomingResult<()> {
        if self.shape() != other.shape() {
            return Err(HomingError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }
}
