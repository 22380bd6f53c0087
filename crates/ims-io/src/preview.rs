//! Stage previews written as PNG files.
//!
//! [`PngPreviewShell`] opens one [`PngPreview`] per slot, each owning a
//! file `<dir>/<slot>.png` that is rewritten on every update. Preview
//! failures are logged and never interrupt the pipeline.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use ims_pipeline::{Frame, PreviewShell, PreviewSink, SlotName};
use tracing::{debug, warn};

use crate::IoError;

/// File name used for a slot's preview.
#[must_use]
pub fn preview_file_name(slot: SlotName) -> String {
    format!("{}.png", slot.label().to_lowercase())
}

/// Scale `frame` to fit inside a `fit`×`fit` box, keeping the aspect
/// ratio. Frames already inside the box are returned at full size.
#[must_use]
pub fn fit_frame(frame: &Frame, fit: Option<u32>) -> image::DynamicImage {
    let image = frame.to_dynamic();
    match fit {
        Some(max) if max > 0 && (image.width() > max || image.height() > max) => {
            // Nearest keeps binary masks and contour strokes crisp.
            image.resize(max, max, FilterType::Nearest)
        }
        _ => image,
    }
}

/// Preview sink backed by a single PNG file.
#[derive(Debug, Clone)]
pub struct PngPreview {
    path: PathBuf,
    fit: Option<u32>,
}

impl PngPreview {
    /// Preview writing to `path`, optionally scaled to fit a square box.
    #[must_use]
    pub const fn new(path: PathBuf, fit: Option<u32>) -> Self {
        Self { path, fit }
    }

    /// The file this preview writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode `frame` to this preview's file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ImageEncode`] if the PNG cannot be written.
    pub fn write(&self, frame: &Frame) -> Result<(), IoError> {
        fit_frame(frame, self.fit)
            .save_with_format(&self.path, image::ImageFormat::Png)
            .map_err(IoError::ImageEncode)
    }

    /// Remove a stale preview file, if any.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if an existing file cannot be removed.
    pub fn clear(&self) -> Result<(), IoError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl PreviewSink for PngPreview {
    fn display(&mut self, frame: &Frame) {
        match self.write(frame) {
            Ok(()) => debug!(path = %self.path.display(), "preview written"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "preview not written"),
        }
    }

    fn display_placeholder(&mut self, text: &str) {
        debug!(path = %self.path.display(), text, "preview placeholder");
        if let Err(e) = self.clear() {
            warn!(path = %self.path.display(), error = %e, "stale preview not removed");
        }
    }
}

/// Opens a [`PngPreview`] for every slot inside one directory.
#[derive(Debug, Clone)]
pub struct PngPreviewShell {
    dir: PathBuf,
    fit: Option<u32>,
}

impl PngPreviewShell {
    /// Create the preview directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the directory cannot be created.
    pub fn new(dir: PathBuf, fit: Option<u32>) -> Result<Self, IoError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, fit })
    }

    /// Where previews are written.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the preview file for `slot`.
    #[must_use]
    pub fn path_for(&self, slot: SlotName) -> PathBuf {
        self.dir.join(preview_file_name(slot))
    }
}

impl PreviewShell for PngPreviewShell {
    fn open_preview(&mut self, slot: SlotName) -> Option<Box<dyn PreviewSink>> {
        Some(Box::new(PngPreview::new(self.path_for(slot), self.fit)))
    }
}
