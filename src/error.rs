use alloc::string::String;
use enough::StopReason;

use crate::pixel::SourceFormat;

/// What exactly was not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Unsupported {
    /// Channel count outside {1, 3, 4}.
    ChannelCount(u32),
    /// Sample depth other than 8 bits.
    BitDepth(u32),
    /// Source pixel format with no planar mapping.
    Format(SourceFormat),
    /// Compressed or otherwise unhandled TGA image type.
    TargaType(u8),
}

impl core::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChannelCount(c) => write!(f, "channel count {c}"),
            Self::BitDepth(d) => write!(f, "bit depth {d}"),
            Self::Format(fmt) => write!(f, "pixel format {fmt:?}"),
            Self::TargaType(t) => write!(f, "TGA image type {t}"),
        }
    }
}

/// Coarse classification of a [`TranscodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotSupported,
    EngineCreateFailed,
    EngineConvertFailed,
    /// Size arithmetic overflow or a configured [`Limits`](crate::Limits) hit.
    Resource,
    Cancelled,
}

/// Errors from planar/interleaved conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TranscodeError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("not supported: {0}")]
    NotSupported(Unsupported),

    #[error("coding engine failed to create an image")]
    EngineCreateFailed,

    #[error("coding engine failed to convert the image")]
    EngineConvertFailed,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl TranscodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::BufferTooSmall { .. } => ErrorKind::InvalidInput,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::EngineCreateFailed => ErrorKind::EngineCreateFailed,
            Self::EngineConvertFailed => ErrorKind::EngineConvertFailed,
            Self::DimensionsTooLarge { .. } | Self::LimitExceeded(_) => ErrorKind::Resource,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<StopReason> for TranscodeError {
    fn from(r: StopReason) -> Self {
        TranscodeError::Cancelled(r)
    }
}

impl From<Unsupported> for TranscodeError {
    fn from(u: Unsupported) -> Self {
        TranscodeError::NotSupported(u)
    }
}
