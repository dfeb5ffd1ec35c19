use crate::device::{NumericCategory, TextureHandle};
use thiserror::Error;

/// Failures of the host-side texture layer. Device-side sampling never fails.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture extent must have 1 to 3 axes, got {0}")]
    InvalidDimensionality(usize),

    #[error("texture extent {extent:?} has an empty axis")]
    EmptyAxis { extent: Vec<u32> },

    #[error("texture extent {extent:?} with {channels} channels does not fit in memory")]
    ExtentTooLarge { extent: Vec<u32>, channels: usize },

    #[error("texel holds 1 to 4 channels, got {0}")]
    InvalidChannelCount(usize),

    #[error("extent {extent:?} with {channels} channels needs {expected} values, got {actual}")]
    TexelCountMismatch { extent: Vec<u32>, channels: usize, expected: usize, actual: usize },

    #[error("linear filtering is not available for {0:?} texels")]
    IntegerFiltering(NumericCategory),

    #[error("stale or unknown texture handle {0:?}")]
    UnknownHandle(TextureHandle),

    #[error("texture {handle:?} cannot be viewed as requested: {reason}")]
    DescriptorMismatch { handle: TextureHandle, reason: String },

    #[error("texel bytes cannot be reinterpreted: {0:?}")]
    Cast(bytemuck::PodCastError),
}

pub type Result<T> = std::result::Result<T, TextureError>;
