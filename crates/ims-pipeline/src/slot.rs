//! Named image slots and the preview capability they push frames to.
//!
//! Each [`SlotName`] variant is one stage of the pipeline. An
//! [`ImageSlot`] holds zero or one [`Frame`] and, optionally, a
//! [`PreviewSink`] supplied by the surrounding shell.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::Frame;

/// Identifier for one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotName {
    /// Reference frame without particles.
    Background,
    /// Captured frame to inspect.
    Raw,
    /// Per-pixel absolute difference of Background and Raw.
    Diff,
    /// Thresholded difference.
    Binary,
    /// Contour outlines traced from the binary mask.
    Contour,
}

impl SlotName {
    /// All slots in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Background,
        Self::Raw,
        Self::Diff,
        Self::Binary,
        Self::Contour,
    ];

    /// Display label, also used as the preview placeholder text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Raw => "Raw",
            Self::Diff => "Diff",
            Self::Binary => "Binary",
            Self::Contour => "Contour",
        }
    }

    /// Whether the user loads this slot directly (as opposed to the
    /// pipeline deriving it).
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::Background | Self::Raw)
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two slots a user can load an image into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserSlot {
    /// See [`SlotName::Background`].
    Background,
    /// See [`SlotName::Raw`].
    Raw,
}

impl From<UserSlot> for SlotName {
    fn from(slot: UserSlot) -> Self {
        match slot {
            UserSlot::Background => Self::Background,
            UserSlot::Raw => Self::Raw,
        }
    }
}

impl fmt::Display for UserSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SlotName::from(*self).fmt(f)
    }
}

/// Something that can show one slot's frame to the user.
///
/// Implementations scale the frame to fit their surface while keeping
/// the aspect ratio. Closing is reported back through
/// [`Pipeline::close_preview`](crate::Pipeline::close_preview).
pub trait PreviewSink {
    /// Render `frame`.
    fn display(&mut self, frame: &Frame);

    /// Show `text` instead of an image when the slot holds no frame.
    fn display_placeholder(&mut self, text: &str);
}

/// Factory the pipeline asks for a preview whenever a slot first needs one.
pub trait PreviewShell {
    /// Open a preview for `slot`, or return `None` if the shell does not
    /// want one.
    fn open_preview(&mut self, slot: SlotName) -> Option<Box<dyn PreviewSink>>;
}

/// Shell that never opens previews. Useful for batch runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreview;

impl PreviewShell for NoPreview {
    fn open_preview(&mut self, _slot: SlotName) -> Option<Box<dyn PreviewSink>> {
        None
    }
}

/// Holder for one stage's frame plus its optional preview.
pub struct ImageSlot {
    name: SlotName,
    frame: Option<Frame>,
    last_filename: Option<String>,
    last_directory: Option<PathBuf>,
    sink: Option<Box<dyn PreviewSink>>,
}

impl fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSlot")
            .field("name", &self.name)
            .field("frame", &self.frame.as_ref().map(Frame::dimensions))
            .field("last_filename", &self.last_filename)
            .field("last_directory", &self.last_directory)
            .field("has_preview", &self.sink.is_some())
            .finish()
    }
}

impl ImageSlot {
    /// Create an empty slot with no preview.
    #[must_use]
    pub const fn new(name: SlotName) -> Self {
        Self {
            name,
            frame: None,
            last_filename: None,
            last_directory: None,
            sink: None,
        }
    }

    /// The slot's identifier.
    #[must_use]
    pub const fn name(&self) -> SlotName {
        self.name
    }

    /// The current frame, if any.
    #[must_use]
    pub const fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Returns `true` if the slot holds no frame (or a zero-sized one).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.as_ref().is_none_or(Frame::is_empty)
    }

    /// Whether a preview is attached.
    #[must_use]
    pub const fn has_preview(&self) -> bool {
        self.sink.is_some()
    }

    /// File name of the last image loaded into this slot.
    #[must_use]
    pub fn last_filename(&self) -> Option<&str> {
        self.last_filename.as_deref()
    }

    /// Directory of the last image loaded into this slot.
    #[must_use]
    pub fn last_directory(&self) -> Option<&Path> {
        self.last_directory.as_deref()
    }

    /// Set the directory the next file picker should start in.
    pub fn set_last_directory(&mut self, dir: PathBuf) {
        self.last_directory = Some(dir);
    }

    /// Record where the current frame was loaded from.
    ///
    /// `None` means the frame has no file behind it: the file name is
    /// cleared and the last directory is kept for the next picker.
    pub fn record_source(&mut self, source: Option<&Path>) {
        self.last_filename = source
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        if let Some(dir) = source
            .and_then(Path::parent)
            .filter(|d| !d.as_os_str().is_empty())
        {
            self.last_directory = Some(dir.to_path_buf());
        }
    }

    /// Status-bar label, e.g. `"Raw: frame_0001.tif"` or `"Raw: <none>"`.
    #[must_use]
    pub fn status_text(&self) -> String {
        match (&self.frame, &self.last_filename) {
            (Some(_), Some(name)) => format!("{}: {name}", self.name),
            _ => format!("{}: <none>", self.name),
        }
    }

    /// Replace the frame (or clear it with `None`) and refresh the preview.
    ///
    /// Zero-sized frames are stored as absent.
    pub fn set_frame(&mut self, frame: Option<Frame>) {
        self.frame = frame.filter(|f| !f.is_empty());
        self.refresh();
    }

    /// Attach a preview and show the current frame on it.
    pub fn attach(&mut self, sink: Box<dyn PreviewSink>) {
        self.sink = Some(sink);
        self.refresh();
    }

    /// Push the current frame (or the placeholder) to the preview.
    pub fn refresh(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        match &self.frame {
            Some(frame) => sink.display(frame),
            None => sink.display_placeholder(self.name.label()),
        }
    }

    /// Drop the frame and detach the preview. Used when the user closes
    /// this slot's preview.
    pub fn release(&mut self) {
        self.sink = None;
        self.frame = None;
        self.last_filename = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::types::{Dimensions, PixelFormat};

    /// What a recording sink has been asked to show.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Shown {
        Frame(Frame),
        Placeholder(String),
    }

    /// Preview sink that appends every update to a shared log.
    pub(crate) struct RecordingSink(pub(crate) Rc<RefCell<Vec<Shown>>>);

    impl PreviewSink for RecordingSink {
        fn display(&mut self, frame: &Frame) {
            self.0.borrow_mut().push(Shown::Frame(frame.clone()));
        }

        fn display_placeholder(&mut self, text: &str) {
            self.0.borrow_mut().push(Shown::Placeholder(text.to_owned()));
        }
    }

    fn gray(width: u32, height: u32) -> Frame {
        Frame::black(Dimensions { width, height }, PixelFormat::Gray8)
    }

    #[test]
    fn all_contains_every_variant_in_order() {
        assert_eq!(SlotName::ALL.len(), 5);
        assert_eq!(SlotName::ALL[0], SlotName::Background);
        assert_eq!(SlotName::ALL[4], SlotName::Contour);
    }

    #[test]
    fn only_background_and_raw_are_user_slots() {
        let user: Vec<_> = SlotName::ALL.into_iter().filter(|s| s.is_user()).collect();
        assert_eq!(user, vec![SlotName::Background, SlotName::Raw]);
        assert_eq!(SlotName::from(UserSlot::Raw), SlotName::Raw);
        assert_eq!(UserSlot::Background.to_string(), "Background");
    }

    #[test]
    fn new_slot_is_empty_without_preview() {
        let slot = ImageSlot::new(SlotName::Diff);
        assert!(slot.is_empty());
        assert!(!slot.has_preview());
        assert_eq!(slot.status_text(), "Diff: <none>");
    }

    #[test]
    fn set_frame_forwards_to_attached_sink() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut slot = ImageSlot::new(SlotName::Raw);
        slot.attach(Box::new(RecordingSink(Rc::clone(&log))));
        slot.set_frame(Some(gray(2, 2)));
        slot.set_frame(None);

        let shown = log.borrow();
        assert_eq!(
            *shown,
            vec![
                Shown::Placeholder("Raw".into()),
                Shown::Frame(gray(2, 2)),
                Shown::Placeholder("Raw".into()),
            ]
        );
    }

    #[test]
    fn zero_sized_frame_is_stored_as_absent() {
        let mut slot = ImageSlot::new(SlotName::Background);
        slot.set_frame(Some(gray(0, 0)));
        assert!(slot.frame().is_none());
    }

    #[test]
    fn record_source_splits_name_and_directory() {
        let mut slot = ImageSlot::new(SlotName::Raw);
        slot.set_frame(Some(gray(1, 1)));
        slot.record_source(Some(Path::new("/data/run7/frame_0001.tif")));
        assert_eq!(slot.last_filename(), Some("frame_0001.tif"));
        assert_eq!(slot.last_directory(), Some(Path::new("/data/run7")));
        assert_eq!(slot.status_text(), "Raw: frame_0001.tif");
    }

    #[test]
    fn frame_without_source_forgets_the_previous_file_name() {
        let mut slot = ImageSlot::new(SlotName::Raw);
        slot.set_frame(Some(gray(1, 1)));
        slot.record_source(Some(Path::new("/a/first.tif")));
        slot.set_frame(Some(gray(2, 2)));
        slot.record_source(None);
        assert_eq!(slot.last_filename(), None);
        assert_eq!(slot.status_text(), "Raw: <none>");
        assert_eq!(slot.last_directory(), Some(Path::new("/a")));
    }

    #[test]
    fn release_clears_frame_and_preview() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut slot = ImageSlot::new(SlotName::Background);
        slot.attach(Box::new(RecordingSink(Rc::clone(&log))));
        slot.set_frame(Some(gray(3, 3)));
        slot.record_source(Some(Path::new("bg.tif")));
        slot.release();

        assert!(slot.is_empty());
        assert!(!slot.has_preview());
        assert_eq!(slot.status_text(), "Background: <none>");

        // Further updates no longer reach the detached sink.
        let before = log.borrow().len();
        slot.set_frame(Some(gray(3, 3)));
        assert_eq!(log.borrow().len(), before);
    }
}
