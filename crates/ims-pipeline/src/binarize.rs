//! Binary thresholding of the difference frame.

use crate::types::Frame;

/// Value written for channels above the threshold.
pub const FOREGROUND: u8 = 255;

/// Map every channel to [`FOREGROUND`] if it is strictly greater than
/// `threshold`, otherwise to 0.
///
/// Colour frames are thresholded channel by channel; the output keeps
/// the input layout.
#[must_use = "returns the binary frame"]
pub fn binarize(diff: &Frame, threshold: f64) -> Frame {
    let data = diff
        .as_raw()
        .iter()
        .map(|&v| {
            if f64::from(v) > threshold {
                FOREGROUND
            } else {
                0
            }
        })
        .collect();

    Frame::from_raw(diff.dimensions(), diff.format(), data)
        .unwrap_or_else(|| Frame::black(diff.dimensions(), diff.format()))
}

/// Number of pixels with at least one foreground channel.
#[must_use]
pub fn foreground_pixels(binary: &Frame) -> u64 {
    binary
        .as_raw()
        .chunks_exact(binary.format().channels())
        .map(|px| u64::from(px.iter().any(|&c| c != 0)))
        .sum()
}
