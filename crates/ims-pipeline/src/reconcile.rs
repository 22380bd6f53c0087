//! Pixel-format reconciliation between Background and Raw.
//!
//! A grayscale background is often captured for a colour camera. Before
//! the two can be differenced the background is promoted to RGB by
//! replicating its gray value into every channel.

use image::{GrayImage, Rgb, RgbImage};

use crate::types::{Frame, PixelFormat};

/// Promote a grayscale image to RGB, one pixel at a time.
///
/// Dimensions are preserved exactly.
#[must_use = "returns the promoted image"]
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Bring `background` into `raw`'s layout if the pair is colour raw over
/// gray background.
///
/// Returns the promoted frame, or `None` when nothing needs to change.
/// The decision depends on Raw's format only, so calling this again on
/// an already promoted background is a no-op.
#[must_use]
pub fn reconcile(background: &Frame, raw: &Frame) -> Option<Frame> {
    match (raw.format(), background) {
        (PixelFormat::Rgb8, Frame::Gray(gray)) => Some(Frame::Color(gray_to_rgb(gray))),
        _ => None,
    }
}
