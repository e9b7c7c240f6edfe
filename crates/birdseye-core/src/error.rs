/// Image dimensions as `(width, height, channels)`.
pub type Dims = (usize, usize, usize);

/// Errors produced by the geometric stitching stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StitchError {
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("dimension mismatch (expected {expected:?}, got {got:?})")]
    DimensionMismatch { expected: Dims, got: Dims },

    #[error("pixel buffer holds {got} bytes, expected {expected}")]
    BufferLength { expected: usize, got: usize },
}

impl StitchError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
