//! Integration test: drive the public pipeline API the way a shell does.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use ims_pipeline::{
    ContourCounts, DynamicImage, Pipeline, PixelFormat, RecomputeReport, SlotName, UserSlot,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Dark background with a few bright "particles" in the raw frame.
fn particle_pair() -> (DynamicImage, DynamicImage) {
    let background = GrayImage::from_pixel(64, 48, Luma([12]));
    let raw = GrayImage::from_fn(64, 48, |x, y| {
        let in_blob = |cx: u32, cy: u32, r: u32| x.abs_diff(cx).pow(2) + y.abs_diff(cy).pow(2) <= r * r;
        if in_blob(15, 15, 5) || in_blob(45, 30, 7) {
            Luma([180])
        } else if (x + y) % 7 == 0 {
            // Sensor noise below the default threshold.
            Luma([20])
        } else {
            Luma([12])
        }
    });
    (
        DynamicImage::ImageLuma8(background),
        DynamicImage::ImageLuma8(raw),
    )
}

#[test]
fn particles_become_separate_contours() {
    let (background, raw) = particle_pair();
    let mut rng = StdRng::seed_from_u64(0);
    let mut pipeline = Pipeline::default();

    pipeline
        .load_user_image(UserSlot::Background, background, None, &mut rng)
        .unwrap();
    let report = pipeline
        .load_user_image(UserSlot::Raw, raw, None, &mut rng)
        .unwrap()
        .expect("both images loaded");

    assert!((report.threshold - 18.0).abs() < f64::EPSILON);
    assert_eq!(report.contours, ContourCounts { outer: 2, hole: 0 });
    assert_eq!(report.format, PixelFormat::Gray8);

    let contour = pipeline.slot(SlotName::Contour).unwrap().frame().unwrap();
    assert_eq!(contour.format(), PixelFormat::Rgb8);
    assert_eq!(contour.dimensions(), report.dimensions);
}

#[test]
fn color_raw_over_gray_background() {
    let background = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([10])));
    let raw = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 10, 10])));
    let mut rng = StdRng::seed_from_u64(0);
    let mut pipeline = Pipeline::default();
    pipeline.set_threshold(5.0);

    pipeline
        .load_user_image(UserSlot::Background, background, None, &mut rng)
        .unwrap();
    let report = pipeline
        .load_user_image(UserSlot::Raw, raw, None, &mut rng)
        .unwrap()
        .unwrap();

    assert!(report.background_promoted);
    assert_eq!(report.contours.total(), 0);
    assert_eq!(report.foreground_pixels, 0);
    let contour = pipeline.contour().unwrap().frame().unwrap();
    assert!(contour.as_raw().iter().all(|&v| v == 0));
}

#[test]
fn report_serializes_to_json() {
    let (background, raw) = particle_pair();
    let mut rng = StdRng::seed_from_u64(3);
    let mut pipeline = Pipeline::default();
    pipeline
        .load_user_image(UserSlot::Background, background, None, &mut rng)
        .unwrap();
    let report = pipeline
        .load_user_image(UserSlot::Raw, raw, None, &mut rng)
        .unwrap()
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["dimensions"]["width"], 64);
    assert_eq!(json["contours"]["outer"], 2);
    assert_eq!(json["format"], "Gray8");

    let back: RecomputeReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
