//! Session summary printed at the end of a run.

use std::fmt;
use std::path::{Path, PathBuf};

use ims_pipeline::{Pipeline, RecomputeReport};
use serde::Serialize;

/// What the user would have seen in the status bar and previews.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Status-bar labels for Background and Raw.
    pub status: [String; 2],
    /// Threshold after any range correction.
    pub threshold: f64,
    /// Result of the last recompute, if one completed.
    pub result: Option<RecomputeReport>,
    /// Directory holding the stage previews.
    pub previews: PathBuf,
}

impl Summary {
    #[must_use]
    pub fn new(pipeline: &Pipeline, result: Option<&RecomputeReport>, previews: &Path) -> Self {
        Self {
            status: pipeline.status_texts(),
            threshold: pipeline.threshold(),
            result: result.cloned(),
            previews: previews.to_path_buf(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status.join(" | "))?;
        let corrected = self
            .result
            .as_ref()
            .is_some_and(|r| r.threshold_corrected);
        writeln!(
            f,
            "threshold   {:.1}{}",
            self.threshold,
            if corrected { " (out of range, reset)" } else { "" }
        )?;
        if let Some(r) = &self.result {
            writeln!(f, "size        {} ({})", r.dimensions, r.format)?;
            if r.background_promoted {
                writeln!(f, "background  promoted to colour")?;
            }
            writeln!(f, "foreground  {} px", r.foreground_pixels)?;
            writeln!(
                f,
                "contours    {} ({} outer, {} hole)",
                r.contours.total(),
                r.contours.outer,
                r.contours.hole
            )?;
        }
        writeln!(f, "previews    {}", self.previews.display())
    }
}
