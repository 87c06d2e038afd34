use image::ImageError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to save image {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Palette index {0} is out of range")]
    PaletteIndex(usize),
}
