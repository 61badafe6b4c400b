use thiserror::Error;

use crate::shape::Shape;

/// Every failure is a precondition violation on the caller's inputs, and is
/// reported before any output is computed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConvError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("channel mismatch: images have {image} channel(s), kernel expects {kernel}")]
    ChannelMismatch { image: usize, kernel: usize },
    #[error("invalid stride ({0}), both axes must be positive")]
    InvalidStride(Shape),
    #[error("invalid padding spec `{0}`, expected `valid`, `same` or `ph,pw`")]
    InvalidPaddingSpec(String),
    #[error("invalid pooling mode `{0}`, expected `max` or `avg`")]
    InvalidMode(String),
}

pub type ConvResult<T> = Result<T, ConvError>;

impl ConvError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }
}
