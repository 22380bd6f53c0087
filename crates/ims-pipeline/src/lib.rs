//! ims-pipeline: background-difference inspection pipeline (sans-IO).
//!
//! Takes a Background and a Raw frame and derives, in order:
//! absolute difference -> binary threshold -> contour overlay.
//!
//! This crate has **no I/O dependencies**. Frames arrive already
//! decoded, previews are reached through the [`PreviewSink`] trait and
//! settings through [`SettingsStore`]. File decoding, PNG previews and
//! JSON settings live in `ims-io`.

pub mod binarize;
pub mod contour;
pub mod diff;
pub mod pipeline;
pub mod reconcile;
pub mod registry;
pub mod settings;
pub mod slot;
pub mod threshold;
pub mod types;

pub use contour::ContourCounts;
pub use pipeline::{Pipeline, RecomputeReport};
pub use registry::{DerivedSlots, SlotRegistry};
pub use settings::{Settings, SettingsStore};
pub use slot::{ImageSlot, NoPreview, PreviewShell, PreviewSink, SlotName, UserSlot};
pub use threshold::{DEFAULT_THRESHOLD, RECOVERY_THRESHOLD};
pub use types::{
    Dimensions, DynamicImage, Frame, GrayImage, PipelineError, PixelFormat, RgbImage,
};
