//! Contour extraction from the binary mask and outline rendering.
//!
//! Tracing uses Suzuki-Abe border following via
//! [`imageproc::contours::find_contours`], which yields the complete
//! border hierarchy (outer borders and holes with parent links) and keeps
//! every boundary pixel. Outlines are stroked with `tiny-skia` onto a
//! black RGB canvas, one random colour per contour.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, Contour};
use imageproc::point::Point;
use rand::Rng;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::types::{Dimensions, Frame};

/// Outline width in pixels.
pub const STROKE_WIDTH: f32 = 2.0;

/// Collapse a binary frame into a single-channel mask.
///
/// A pixel is foreground if any of its channels is non-zero.
#[must_use = "returns the mask"]
pub fn mask(binary: &Frame) -> GrayImage {
    match binary {
        Frame::Gray(img) => img.clone(),
        Frame::Color(img) => GrayImage::from_fn(img.width(), img.height(), |x, y| {
            let any = img.get_pixel(x, y).0.iter().any(|&c| c != 0);
            Luma([if any { 255 } else { 0 }])
        }),
    }
}

/// Trace every border in the binary frame.
///
/// Border following needs a background ring around the mask, so the mask
/// is traced inside a one-pixel zero frame and the points are shifted
/// back to frame coordinates. Regions touching the image edge come out as
/// outer borders like any other.
#[must_use]
pub fn trace(binary: &Frame) -> Vec<Contour<u32>> {
    let mask = mask(binary);
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, &mask, 1, 1);

    let mut contours = imageproc::contours::find_contours::<u32>(&padded);
    for contour in &mut contours {
        for p in &mut contour.points {
            *p = Point::new(p.x.saturating_sub(1), p.y.saturating_sub(1));
        }
    }
    contours
}

/// Count of traced borders split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContourCounts {
    /// Outer borders of foreground regions.
    pub outer: usize,
    /// Borders of holes inside foreground regions.
    pub hole: usize,
}

impl ContourCounts {
    /// Tally a set of traced contours.
    #[must_use]
    pub fn of(contours: &[Contour<u32>]) -> Self {
        contours
            .iter()
            .fold(Self::default(), |mut counts, c| {
                match c.border_type {
                    BorderType::Outer => counts.outer += 1,
                    BorderType::Hole => counts.hole += 1,
                }
                counts
            })
    }

    /// Total number of contours.
    #[must_use]
    pub const fn total(self) -> usize {
        self.outer + self.hole
    }
}

/// Rendered contour overlay plus the colour used for each contour.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Black canvas with every outline drawn on it.
    pub image: RgbImage,
    /// Colour of contour `i`, in trace order.
    pub colors: Vec<[u8; 3]>,
}

/// Draw a random-coloured outline for every contour on a black canvas.
///
/// Each colour component is drawn independently and uniformly from
/// `0..=255`. Later contours paint over earlier ones where they overlap.
#[allow(clippy::cast_precision_loss)]
pub fn draw<R: Rng>(contours: &[Contour<u32>], size: Dimensions, rng: &mut R) -> Overlay {
    let colors: Vec<[u8; 3]> = contours
        .iter()
        .map(|_| {
            [
                rng.gen_range(0..=u8::MAX),
                rng.gen_range(0..=u8::MAX),
                rng.gen_range(0..=u8::MAX),
            ]
        })
        .collect();

    let Some(mut pixmap) = Pixmap::new(size.width, size.height) else {
        // Zero-sized canvas: nothing to draw on.
        return Overlay {
            image: RgbImage::new(size.width, size.height),
            colors,
        };
    };

    let stroke = Stroke {
        width: STROKE_WIDTH,
        line_cap: LineCap::Square,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };

    for (contour, color) in contours.iter().zip(&colors) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = false;

        // Pixel centres sit at +0.5 in tiny-skia's coordinate space.
        let centre = |p: &Point<u32>| (p.x as f32 + 0.5, p.y as f32 + 0.5);

        match contour.points.as_slice() {
            [] => {}
            [only] => {
                let (cx, cy) = centre(only);
                let half = STROKE_WIDTH / 2.0;
                if let Some(rect) = Rect::from_xywh(cx - half, cy - half, STROKE_WIDTH, STROKE_WIDTH)
                {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
            [first, rest @ ..] => {
                let mut pb = PathBuilder::new();
                let (x, y) = centre(first);
                pb.move_to(x, y);
                for p in rest {
                    let (x, y) = centre(p);
                    pb.line_to(x, y);
                }
                pb.close();
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
    }

    Overlay {
        image: pixmap_to_rgb(&pixmap),
        colors,
    }
}

/// Flatten a premultiplied RGBA pixmap onto black.
///
/// Over a black background the premultiplied colour is exactly the
/// composited colour, so alpha can simply be dropped.
fn pixmap_to_rgb(pixmap: &Pixmap) -> RgbImage {
    let data = pixmap.data();
    let raw = data
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .unwrap_or_else(|| RgbImage::new(pixmap.width(), pixmap.height()))
}
