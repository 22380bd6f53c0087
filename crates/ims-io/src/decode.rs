//! Image file decoding.
//!
//! Reads a still image (TIFF, PNG, BMP, JPEG) from disk without any
//! colour conversion: the pipeline decides whether the decoded layout is
//! acceptable.

use std::path::Path;

use ims_pipeline::DynamicImage;
use tracing::debug;

use crate::IoError;

/// Decode the image at `path`.
///
/// The format is guessed from the file contents, not the extension.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be read,
/// [`IoError::EmptyInput`] if it is empty, and
/// [`IoError::ImageDecode`] if the contents are not a supported image.
pub fn decode_file(path: &Path) -> Result<DynamicImage, IoError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(IoError::EmptyInput(path.to_path_buf()));
    }
    let image = image::load_from_memory(&bytes).map_err(IoError::ImageDecode)?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );
    Ok(image)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    use super::*;

    #[test]
    fn gray_png_stays_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        GrayImage::from_pixel(5, 3, Luma([7])).save(&path).unwrap();

        let image = decode_file(&path).unwrap();
        assert!(matches!(image, DynamicImage::ImageLuma8(_)));
        assert_eq!((image.width(), image.height()), (5, 3));
    }

    #[test]
    fn rgb_tiff_stays_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.tif");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&path).unwrap();

        let image = decode_file(&path).unwrap();
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tif");
        std::fs::write(&path, []).unwrap();
        assert!(matches!(decode_file(&path), Err(IoError::EmptyInput(_))));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.tif");
        std::fs::write(&path, [0xFF, 0xFE, 0x00, 0x01]).unwrap();
        assert!(matches!(decode_file(&path), Err(IoError::ImageDecode(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            decode_file(&dir.path().join("nope.tif")),
            Err(IoError::Io(_))
        ));
    }
}
