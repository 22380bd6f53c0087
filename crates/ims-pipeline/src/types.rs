//! Shared types for the ims difference pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `DynamicImage` so shells can hand decoded images to the
/// pipeline without depending on `image` directly.
pub use image::DynamicImage;

/// Re-export `GrayImage` for single-channel frames.
pub use image::GrayImage;

/// Re-export `RgbImage` for three-channel frames.
pub use image::RgbImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layout of a [`Frame`]. Both layouts use 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// One channel, 8-bit grayscale.
    Gray8,
    /// Three channels, 8-bit RGB.
    Rgb8,
}

impl PixelFormat {
    /// Number of 8-bit channels per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray8 => f.write_str("Gray8"),
            Self::Rgb8 => f.write_str("Rgb8"),
        }
    }
}

/// A 2-D, 8-bit-per-channel pixel grid held by one pipeline slot.
///
/// Only grayscale and RGB layouts exist; anything else the decoder
/// produces is rejected at the pipeline boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Single-channel grayscale frame.
    Gray(GrayImage),
    /// Three-channel colour frame.
    Color(RgbImage),
}

impl Frame {
    /// Allocate a zero-filled (black) frame.
    #[must_use]
    pub fn black(dimensions: Dimensions, format: PixelFormat) -> Self {
        match format {
            PixelFormat::Gray8 => Self::Gray(GrayImage::new(dimensions.width, dimensions.height)),
            PixelFormat::Rgb8 => Self::Color(RgbImage::new(dimensions.width, dimensions.height)),
        }
    }

    /// Pixel layout of this frame.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        match self {
            Self::Gray(_) => PixelFormat::Gray8,
            Self::Color(_) => PixelFormat::Rgb8,
        }
    }

    /// Width and height in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            Self::Gray(img) => img.dimensions(),
            Self::Color(img) => img.dimensions(),
        };
        Dimensions { width, height }
    }

    /// Returns `true` if the frame has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let d = self.dimensions();
        d.width == 0 || d.height == 0
    }

    /// Interleaved channel bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Gray(img) => img.as_raw(),
            Self::Color(img) => img.as_raw(),
        }
    }

    /// Rebuild a frame of the given layout from interleaved bytes.
    ///
    /// Returns `None` when `data` does not hold exactly
    /// `width * height * channels` bytes.
    #[must_use]
    pub fn from_raw(dimensions: Dimensions, format: PixelFormat, data: Vec<u8>) -> Option<Self> {
        match format {
            PixelFormat::Gray8 => {
                GrayImage::from_raw(dimensions.width, dimensions.height, data).map(Self::Gray)
            }
            PixelFormat::Rgb8 => {
                RgbImage::from_raw(dimensions.width, dimensions.height, data).map(Self::Color)
            }
        }
    }

    /// Convert to a `DynamicImage` for encoding or resizing.
    #[must_use]
    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img.clone()),
            Self::Color(img) => DynamicImage::ImageRgb8(img.clone()),
        }
    }
}

impl TryFrom<DynamicImage> for Frame {
    type Error = PipelineError;

    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        match image {
            DynamicImage::ImageLuma8(img) => Ok(Self::Gray(img)),
            DynamicImage::ImageRgb8(img) => Ok(Self::Color(img)),
            other => Err(PipelineError::UnsupportedFormat(format!(
                "{:?}",
                other.color()
            ))),
        }
    }
}

/// Errors reported by pipeline operations.
///
/// None of these are fatal: every variant leaves the previously stored
/// frames untouched so the user can recover by loading another file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The candidate image is not 8-bit grayscale or 8-bit RGB.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Background or Raw has not been loaded yet.
    #[error("background and raw images are both required")]
    MissingInput,

    /// Background and Raw cannot be combined pixel by pixel.
    #[error(
        "background ({background_format} {background}) does not match raw ({raw_format} {raw})"
    )]
    IncompatibleInputs {
        /// Background dimensions.
        background: Dimensions,
        /// Background pixel format after reconciliation.
        background_format: PixelFormat,
        /// Raw dimensions.
        raw: Dimensions,
        /// Raw pixel format.
        raw_format: PixelFormat,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gray_dynamic_image_is_accepted() {
        let frame = Frame::try_from(DynamicImage::ImageLuma8(GrayImage::new(3, 2))).unwrap();
        assert_eq!(frame.format(), PixelFormat::Gray8);
        assert_eq!(
            frame.dimensions(),
            Dimensions {
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn rgb_dynamic_image_is_accepted() {
        let frame = Frame::try_from(DynamicImage::ImageRgb8(RgbImage::new(5, 4))).unwrap();
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(frame.as_raw().len(), 5 * 4 * 3);
    }

    #[test]
    fn rgba_and_sixteen_bit_images_are_rejected() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        assert!(matches!(
            Frame::try_from(rgba),
            Err(PipelineError::UnsupportedFormat(_))
        ));

        let gray16 = DynamicImage::ImageLuma16(image::ImageBuffer::new(2, 2));
        assert!(matches!(
            Frame::try_from(gray16),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn from_raw_checks_length() {
        let dims = Dimensions {
            width: 2,
            height: 2,
        };
        assert!(Frame::from_raw(dims, PixelFormat::Rgb8, vec![0; 12]).is_some());
        assert!(Frame::from_raw(dims, PixelFormat::Rgb8, vec![0; 4]).is_none());
        assert!(Frame::from_raw(dims, PixelFormat::Gray8, vec![0; 4]).is_some());
    }

    #[test]
    fn black_frame_is_zeroed() {
        let dims = Dimensions {
            width: 4,
            height: 3,
        };
        let frame = Frame::black(dims, PixelFormat::Rgb8);
        assert_eq!(frame.dimensions(), dims);
        assert!(frame.as_raw().iter().all(|&b| b == 0));
        assert!(!frame.is_empty());
        assert!(Frame::black(Dimensions { width: 0, height: 3 }, PixelFormat::Gray8).is_empty());
    }

    #[test]
    fn dimensions_display() {
        let dims = Dimensions {
            width: 640,
            height: 480,
        };
        assert_eq!(dims.to_string(), "640x480");
    }
}
