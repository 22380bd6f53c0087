//! Absolute difference between Background and Raw.

use crate::types::{Frame, PipelineError};

/// Compute `|background - raw|` per pixel and per channel.
///
/// The output has the same dimensions and layout as the inputs. Both
/// frames must already share a layout and size (see
/// [`reconcile`](crate::reconcile::reconcile)).
///
/// # Errors
///
/// Returns [`PipelineError::IncompatibleInputs`] if the frames differ in
/// dimensions or pixel format.
pub fn abs_diff(background: &Frame, raw: &Frame) -> Result<Frame, PipelineError> {
    if background.format() != raw.format() || background.dimensions() != raw.dimensions() {
        return Err(PipelineError::IncompatibleInputs {
            background: background.dimensions(),
            background_format: background.format(),
            raw: raw.dimensions(),
            raw_format: raw.format(),
        });
    }

    let data = background
        .as_raw()
        .iter()
        .zip(raw.as_raw())
        .map(|(&b, &r)| b.abs_diff(r))
        .collect();

    Frame::from_raw(raw.dimensions(), raw.format(), data).ok_or(
        PipelineError::IncompatibleInputs {
            background: background.dimensions(),
            background_format: background.format(),
            raw: raw.dimensions(),
            raw_format: raw.format(),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    use super::*;
    use crate::types::{Dimensions, PixelFormat};

    #[test]
    fn gray_difference_is_symmetric_absolute() {
        let bg = Frame::Gray(GrayImage::from_fn(16, 16, |x, _| Luma([(x * 16) as u8])));
        let raw = Frame::Gray(GrayImage::from_fn(16, 16, |_, y| Luma([(y * 16) as u8])));
        let diff = abs_diff(&bg, &raw).unwrap();
        assert_eq!(diff.format(), PixelFormat::Gray8);
        for (i, &v) in diff.as_raw().iter().enumerate() {
            let (x, y) = (i as u32 % 16, i as u32 / 16);
            let expected = (x * 16).abs_diff(y * 16) as u8;
            assert_eq!(v, expected, "pixel ({x}, {y})");
        }
        assert_eq!(abs_diff(&raw, &bg).unwrap(), diff);
    }

    #[test]
    fn color_difference_is_per_channel() {
        let bg = Frame::Color(RgbImage::from_pixel(3, 2, Rgb([10, 200, 0])));
        let raw = Frame::Color(RgbImage::from_pixel(3, 2, Rgb([30, 50, 255])));
        let diff = abs_diff(&bg, &raw).unwrap();
        assert_eq!(diff.format(), PixelFormat::Rgb8);
        for px in diff.as_raw().chunks_exact(3) {
            assert_eq!(px, [20, 150, 255]);
        }
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let bg = Frame::black(Dimensions { width: 4, height: 4 }, PixelFormat::Gray8);
        let raw = Frame::black(Dimensions { width: 4, height: 5 }, PixelFormat::Gray8);
        assert!(matches!(
            abs_diff(&bg, &raw),
            Err(PipelineError::IncompatibleInputs { .. })
        ));
    }

    #[test]
    fn mismatched_formats_are_rejected() {
        let dims = Dimensions { width: 2, height: 2 };
        let bg = Frame::black(dims, PixelFormat::Rgb8);
        let raw = Frame::black(dims, PixelFormat::Gray8);
        assert!(abs_diff(&bg, &raw).is_err());
    }
}
