//! ims-io: filesystem I/O for the ims pipeline.
//!
//! Decodes image files into [`DynamicImage`](ims_pipeline::DynamicImage)s,
//! writes stage previews as PNG files, and persists settings as JSON.
//! All image arithmetic stays in `ims-pipeline`.

pub mod decode;
pub mod preview;
pub mod settings;

pub use decode::decode_file;
pub use preview::{PngPreview, PngPreviewShell};
pub use settings::JsonSettings;

/// Errors from file-backed operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The file exists but holds no bytes.
    #[error("image file is empty: {0}")]
    EmptyInput(std::path::PathBuf),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is unrecognized or the data is corrupt.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Writing a preview image failed.
    #[error("failed to encode preview: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// The settings file is not valid JSON for [`Settings`](ims_pipeline::Settings).
    #[error("invalid settings file: {0}")]
    Settings(#[from] serde_json::Error),
}
