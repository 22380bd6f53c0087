//! The Background + Raw → Diff → Binary → Contour pipeline.
//!
//! [`Pipeline`] owns every slot and recomputes all derived stages, in
//! order, each time a user image is loaded:
//!
//! ```rust
//! # use ims_pipeline::{Pipeline, PipelineError, UserSlot, DynamicImage, GrayImage};
//! # use rand::SeedableRng;
//! # fn run() -> Result<(), PipelineError> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut pipeline = Pipeline::default();
//!
//! let background = DynamicImage::ImageLuma8(GrayImage::new(64, 48));
//! let raw = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 48, image::Luma([50])));
//! pipeline.load_user_image(UserSlot::Background, background, None, &mut rng)?;
//! let report = pipeline.load_user_image(UserSlot::Raw, raw, None, &mut rng)?;
//!
//! assert_eq!(report.map(|r| r.contours.outer), Some(1));
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! Every call is synchronous and runs to completion. A recompute either
//! finishes all stages or stops early. Stopping on a missing input
//! changes nothing. Stopping on an incompatible pair clears the derived
//! frames, so no stage ever shows a frame sized for an older Raw.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::binarize::{binarize, foreground_pixels};
use crate::contour::{self, ContourCounts};
use crate::diff::abs_diff;
use crate::reconcile::reconcile;
use crate::registry::SlotRegistry;
use crate::settings::SettingsStore;
use crate::slot::{ImageSlot, NoPreview, PreviewShell, SlotName, UserSlot};
use crate::threshold::{DEFAULT_THRESHOLD, clamp_threshold};
use crate::types::{Dimensions, DynamicImage, Frame, PipelineError, PixelFormat};

/// Summary of one completed recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeReport {
    /// Raw (and therefore every derived frame's) dimensions.
    pub dimensions: Dimensions,
    /// Raw's pixel format, shared by Diff and Binary.
    pub format: PixelFormat,
    /// Threshold actually applied.
    pub threshold: f64,
    /// Whether the supplied threshold was out of range and replaced.
    pub threshold_corrected: bool,
    /// Whether Background was promoted from gray to colour in this call.
    pub background_promoted: bool,
    /// Whether Diff, Binary and Contour were created in this call.
    pub allocated: bool,
    /// Pixels with at least one foreground channel in Binary.
    pub foreground_pixels: u64,
    /// Contours drawn on Contour.
    pub contours: ContourCounts,
}

/// Owner of all slots and driver of the stage sequence.
pub struct Pipeline {
    slots: SlotRegistry,
    threshold: f64,
    shell: Box<dyn PreviewShell>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("slots", &self.slots)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    /// A pipeline that never opens previews.
    fn default() -> Self {
        Self::new(Box::new(NoPreview))
    }
}

impl Pipeline {
    /// Create a pipeline with empty Background and Raw slots and the
    /// session-start threshold. `shell` is asked for a preview whenever
    /// a slot first needs one.
    #[must_use]
    pub fn new(shell: Box<dyn PreviewShell>) -> Self {
        Self {
            slots: SlotRegistry::new(),
            threshold: DEFAULT_THRESHOLD,
            shell,
        }
    }

    /// All slots.
    #[must_use]
    pub const fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    /// Look up a slot by name. Derived slots are `None` until allocated.
    #[must_use]
    pub fn slot(&self, name: SlotName) -> Option<&ImageSlot> {
        self.slots.get(name)
    }

    /// The Background slot.
    #[must_use]
    pub const fn background(&self) -> &ImageSlot {
        self.slots.background()
    }

    /// The Raw slot.
    #[must_use]
    pub const fn raw(&self) -> &ImageSlot {
        self.slots.raw()
    }

    /// The Diff slot, once allocated.
    #[must_use]
    pub fn diff(&self) -> Option<&ImageSlot> {
        self.slots.derived().map(|d| &d.diff)
    }

    /// The Binary slot, once allocated.
    #[must_use]
    pub fn binary(&self) -> Option<&ImageSlot> {
        self.slots.derived().map(|d| &d.binary)
    }

    /// The Contour slot, once allocated.
    #[must_use]
    pub fn contour(&self) -> Option<&ImageSlot> {
        self.slots.derived().map(|d| &d.contour)
    }

    /// Current threshold. After a recompute this reflects any range
    /// correction, so a shell can write it back to its input field.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Store a user-supplied threshold. It is validated on the next
    /// [`recompute`](Self::recompute).
    pub const fn set_threshold(&mut self, value: f64) {
        self.threshold = value;
    }

    /// Replace an out-of-range threshold (NaN included) with the recovery
    /// value. Returns `true` if the stored value changed.
    pub fn correct_threshold(&mut self) -> bool {
        let clamped = clamp_threshold(self.threshold);
        if clamped.to_bits() == self.threshold.to_bits() {
            return false;
        }
        warn!(
            supplied = self.threshold,
            replacement = clamped,
            "threshold out of range"
        );
        self.threshold = clamped;
        true
    }

    /// Status-bar labels for the user slots.
    #[must_use]
    pub fn status_texts(&self) -> [String; 2] {
        [self.background().status_text(), self.raw().status_text()]
    }

    /// Restore session state: threshold and the last directory of each
    /// user slot.
    pub fn restore(&mut self, settings: &dyn SettingsStore) {
        self.threshold = settings.threshold();
        for slot in [UserSlot::Background, UserSlot::Raw] {
            if let Some(dir) = settings.last_directory(slot.into()) {
                self.slots.user_mut(slot).set_last_directory(dir);
            }
        }
        debug!(threshold = self.threshold, "restored settings");
    }

    /// Save session state: threshold and the last directory of every
    /// slot that has one.
    pub fn save(&self, settings: &mut dyn SettingsStore) {
        settings.set_threshold(self.threshold);
        for slot in self.slots.iter() {
            if let Some(dir) = slot.last_directory() {
                settings.set_last_directory(slot.name(), dir);
            }
        }
    }

    /// Store a decoded user image in `slot` and recompute.
    ///
    /// `source` is the file the image came from, recorded as the slot's
    /// last filename and directory.
    ///
    /// Returns the recompute report, or `None` if the recompute stopped
    /// early because the other user image is missing or incompatible.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedFormat`] if `candidate` is not
    /// 8-bit gray or 8-bit RGB. The slot is left untouched in that case.
    pub fn load_user_image<R: Rng>(
        &mut self,
        slot: UserSlot,
        candidate: DynamicImage,
        source: Option<&Path>,
        rng: &mut R,
    ) -> Result<Option<RecomputeReport>, PipelineError> {
        let frame = Frame::try_from(candidate).inspect_err(|e| {
            warn!(%slot, error = %e, "rejected image");
        })?;
        info!(%slot, size = %frame.dimensions(), format = %frame.format(), "loaded image");

        let target = self.slots.user_mut(slot);
        target.set_frame(Some(frame));
        target.record_source(source);
        if !target.has_preview()
            && let Some(sink) = self.shell.open_preview(slot.into())
        {
            target.attach(sink);
        }

        match self.recompute(rng) {
            Ok(report) => Ok(Some(report)),
            Err(PipelineError::MissingInput) => Ok(None),
            Err(e) => {
                warn!(error = %e, "recompute skipped");
                Ok(None)
            }
        }
    }

    /// Recompute Diff, Binary and Contour from Background and Raw.
    ///
    /// # Steps
    ///
    /// 1. Require both user images
    /// 2. Promote a gray Background to colour under a colour Raw
    /// 3. Allocate the derived slots on first use
    /// 4. Replace an out-of-range threshold with the recovery value
    /// 5. Absolute difference
    /// 6. Binary threshold
    /// 7. Contour tracing and drawing
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] if either user image is
    /// absent, and [`PipelineError::IncompatibleInputs`] if the two
    /// images differ in size, or in format after promotion. A missing
    /// input leaves every slot untouched. Incompatible inputs leave the
    /// user slots untouched and clear any derived frames, since those no
    /// longer match Raw.
    pub fn recompute<R: Rng>(&mut self, rng: &mut R) -> Result<RecomputeReport, PipelineError> {
        // 1. Validate.
        if self.slots.background().is_empty() || self.slots.raw().is_empty() {
            debug!("recompute skipped: missing input");
            return Err(PipelineError::MissingInput);
        }

        // 2. Format reconciliation. Sizes are checked first so a rejected
        // pair leaves Background as it was.
        if let Err(e) = self.check_compatible() {
            if let Some(derived) = self.slots.derived_mut() {
                debug!("clearing derived slots after incompatible inputs");
                derived.clear();
            }
            return Err(e);
        }
        let background_promoted = {
            let (background, raw) = self.slots.user_pair_mut();
            let promoted = match (background.frame(), raw.frame()) {
                (Some(b), Some(r)) => reconcile(b, r),
                _ => None,
            };
            let changed = promoted.is_some();
            if changed {
                debug!("promoted background to colour");
                background.set_frame(promoted);
            }
            changed
        };

        // 4. Clamp threshold.
        let threshold_corrected = self.correct_threshold();
        let threshold = self.threshold;

        let (Some(background), Some(raw)) =
            (self.slots.background().frame(), self.slots.raw().frame())
        else {
            return Err(PipelineError::MissingInput);
        };
        let dimensions = raw.dimensions();
        let format = raw.format();

        // 5. Difference (computed before allocation; stored after).
        let diff = abs_diff(background, raw)?;

        // 3. Allocate derived slots.
        let (derived, allocated) = self.slots.derived_or_allocate();
        if allocated {
            info!(size = %dimensions, %format, "allocated derived slots");
            derived.diff.set_frame(Some(Frame::black(dimensions, format)));
            derived.binary.set_frame(Some(Frame::black(dimensions, format)));
            derived
                .contour
                .set_frame(Some(Frame::black(dimensions, PixelFormat::Rgb8)));
            for slot in [&mut derived.diff, &mut derived.binary, &mut derived.contour] {
                if let Some(sink) = self.shell.open_preview(slot.name()) {
                    slot.attach(sink);
                }
            }
        }

        // 6. Binarize.
        let binary = binarize(&diff, threshold);
        let foreground = foreground_pixels(&binary);

        // 7. Contours.
        let traced = contour::trace(&binary);
        let counts = ContourCounts::of(&traced);
        let overlay = contour::draw(&traced, dimensions, rng);

        derived.diff.set_frame(Some(diff));
        derived.binary.set_frame(Some(binary));
        derived.contour.set_frame(Some(Frame::Color(overlay.image)));

        debug!(
            threshold,
            foreground_pixels = foreground,
            outer = counts.outer,
            hole = counts.hole,
            "recompute finished"
        );

        Ok(RecomputeReport {
            dimensions,
            format,
            threshold,
            threshold_corrected,
            background_promoted,
            allocated,
            foreground_pixels: foreground,
            contours: counts,
        })
    }

    /// Whether Background and Raw can be differenced once a gray
    /// Background has been promoted under a colour Raw.
    fn check_compatible(&self) -> Result<(), PipelineError> {
        let (Some(background), Some(raw)) =
            (self.slots.background().frame(), self.slots.raw().frame())
        else {
            return Err(PipelineError::MissingInput);
        };
        let promotable =
            background.format() == PixelFormat::Gray8 && raw.format() == PixelFormat::Rgb8;
        if background.dimensions() == raw.dimensions()
            && (background.format() == raw.format() || promotable)
        {
            return Ok(());
        }
        Err(PipelineError::IncompatibleInputs {
            background: background.dimensions(),
            background_format: background.format(),
            raw: raw.dimensions(),
            raw_format: raw.format(),
        })
    }

    /// The shell's notification that the user closed `slot`'s preview.
    ///
    /// The slot's frame is dropped and its preview detached. Derived
    /// slots stay allocated; later recomputes refill their frames but do
    /// not reopen the preview.
    pub fn close_preview(&mut self, slot: SlotName) {
        if let Some(target) = self.slots.get_mut(slot)
            && target.has_preview()
        {
            info!(%slot, "preview closed");
            target.release();
        }
    }
}
