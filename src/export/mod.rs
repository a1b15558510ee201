//! Snippet composition and PNG export.

pub mod fonts;
pub mod raster;
pub mod session;
pub mod snippet;
pub mod style;

pub use raster::{CaptureOptions, CardRasterizer, ExportedImage, export_image};
pub use session::{ExportPhase, ExportSession};
pub use style::{Background, SnippetFont};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    MissingTarget,
    #[error("The preview is still loading")]
    NotReady,
    #[error("No usable font found for {0}")]
    FontUnavailable(&'static str),
    #[error("Rendering failed: {0}")]
    Render(String),
    #[error("Could not encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
