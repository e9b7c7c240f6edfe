use crate::config::CameraPosition;
use birdseye_core::StitchError;
use std::path::PathBuf;

/// Errors produced by the end-to-end helpers. Any of them aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("cannot load image {}: {reason}", path.display())]
    ResourceUnavailable { path: PathBuf, reason: String },

    #[cfg(feature = "image")]
    #[error("cannot write image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("images with {0} channels cannot be encoded")]
    UnsupportedChannels(usize),

    #[error("{camera} camera: {source}")]
    Camera {
        camera: CameraPosition,
        #[source]
        source: StitchError,
    },

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
