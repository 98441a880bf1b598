//! Error types for transcode operations.

use crate::types::OutputFormat;
use core::fmt;

/// Result type for transcode operations.
///
/// Errors carry the source location where they were raised.
pub type Result<T> = core::result::Result<T, whereat::At<Error>>;

/// Error type for transcode operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input pointer was null.
    NullInput,
    /// The input was zero bytes long.
    EmptyInput,
    /// The WebP header could not be parsed (dimension probe failed).
    InvalidWebP,
    /// Decoding the WebP bitstream failed.
    DecodeFailed(DecodingError),
    /// The PNG or JPEG encoder reported a failure.
    EncodeFailed {
        /// Target format of the failed encode.
        format: OutputFormat,
        /// Encoder message.
        reason: String,
    },
    /// Memory allocation failed
    OutOfMemory,
    /// Configuration validation failed
    InvalidConfig(String),
    /// The encoder for this format was not compiled in.
    UnsupportedFormat(OutputFormat),
}

impl Error {
    /// Whether the failure was caused by the input rather than by the encoder.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::NullInput | Error::EmptyInput | Error::InvalidWebP | Error::DecodeFailed(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullInput => write!(f, "input pointer is null"),
            Error::EmptyInput => write!(f, "input is empty"),
            Error::InvalidWebP => write!(f, "invalid WebP data"),
            Error::DecodeFailed(e) => write!(f, "decode failed: {}", e),
            Error::EncodeFailed { format, reason } => {
                write!(f, "{} encode failed: {}", format, reason)
            }
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::UnsupportedFormat(format) => write!(f, "{} support not enabled", format),
        }
    }
}

impl std::error::Error for Error {}

/// Reason libwebp gave for rejecting a bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingError {
    /// libwebp could not allocate its working memory.
    OutOfMemory,
    /// libwebp rejected the call parameters.
    InvalidParam,
    /// The bitstream is malformed.
    BitstreamError,
    /// Valid WebP using a feature this crate does not decode (animation).
    UnsupportedFeature,
    /// The data ends before the image does.
    NotEnoughData,
}

impl DecodingError {
    /// Map a failing `VP8StatusCode`. Statuses only produced by incremental
    /// decoding are reported as truncated or malformed input.
    pub(crate) fn from_status(status: libwebp_sys::VP8StatusCode) -> Self {
        use libwebp_sys::VP8StatusCode::*;
        match status {
            VP8_STATUS_OUT_OF_MEMORY => DecodingError::OutOfMemory,
            VP8_STATUS_INVALID_PARAM => DecodingError::InvalidParam,
            VP8_STATUS_UNSUPPORTED_FEATURE => DecodingError::UnsupportedFeature,
            VP8_STATUS_NOT_ENOUGH_DATA | VP8_STATUS_SUSPENDED => DecodingError::NotEnoughData,
            _ => DecodingError::BitstreamError,
        }
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DecodingError::OutOfMemory => "out of memory",
            DecodingError::InvalidParam => "invalid param",
            DecodingError::BitstreamError => "bitstream error",
            DecodingError::UnsupportedFeature => "unsupported feature",
            DecodingError::NotEnoughData => "not enough data",
        };
        f.write_str(msg)
    }
}

/// Integer error code that can be passed through the C/WebAssembly boundary.
///
/// `ErrorCode::None` means the last call on the thread succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error
    #[default]
    None = 0,
    /// Null input pointer
    NullInput = 1,
    /// Zero-length input
    EmptyInput = 2,
    /// Header probe failed
    InvalidWebP = 3,
    /// Bitstream decode failed
    DecodeFailed = 4,
    /// Encoder failed
    EncodeFailed = 5,
    /// Allocation failed
    OutOfMemory = 6,
    /// Bad configuration
    InvalidConfig = 7,
    /// Output format not compiled in
    UnsupportedFormat = 8,
}

impl From<&Error> for ErrorCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::NullInput => ErrorCode::NullInput,
            Error::EmptyInput => ErrorCode::EmptyInput,
            Error::InvalidWebP => ErrorCode::InvalidWebP,
            Error::DecodeFailed(DecodingError::OutOfMemory) => ErrorCode::OutOfMemory,
            Error::DecodeFailed(_) => ErrorCode::DecodeFailed,
            Error::EncodeFailed { .. } => ErrorCode::EncodeFailed,
            Error::OutOfMemory => ErrorCode::OutOfMemory,
            Error::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Error::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NullInput.to_string(), "input pointer is null");
        assert_eq!(
            Error::DecodeFailed(DecodingError::BitstreamError).to_string(),
            "decode failed: bitstream error"
        );
        let e = Error::EncodeFailed {
            format: OutputFormat::Jpeg,
            reason: "bad write".into(),
        };
        assert_eq!(e.to_string(), "JPEG encode failed: bad write");
        assert_eq!(
            Error::UnsupportedFormat(OutputFormat::Png).to_string(),
            "PNG support not enabled"
        );
    }

    #[test]
    fn test_status_mapping() {
        use libwebp_sys::VP8StatusCode::*;
        assert_eq!(
            DecodingError::from_status(VP8_STATUS_BITSTREAM_ERROR),
            DecodingError::BitstreamError
        );
        assert_eq!(
            DecodingError::from_status(VP8_STATUS_UNSUPPORTED_FEATURE),
            DecodingError::UnsupportedFeature
        );
        assert_eq!(
            DecodingError::from_status(VP8_STATUS_SUSPENDED),
            DecodingError::NotEnoughData
        );
        assert_eq!(
            DecodingError::from_status(VP8_STATUS_USER_ABORT),
            DecodingError::BitstreamError
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::default() as u8, 0);
        assert_eq!(ErrorCode::from(&Error::NullInput), ErrorCode::NullInput);
        assert_eq!(ErrorCode::from(&Error::InvalidWebP), ErrorCode::InvalidWebP);
        assert_eq!(
            ErrorCode::from(&Error::DecodeFailed(DecodingError::OutOfMemory)),
            ErrorCode::OutOfMemory
        );
        assert_eq!(
            ErrorCode::from(&Error::DecodeFailed(DecodingError::NotEnoughData)) as u8,
            4
        );
    }

    #[test]
    fn test_input_vs_encoder_domain() {
        assert!(Error::InvalidWebP.is_input_error());
        assert!(Error::DecodeFailed(DecodingError::BitstreamError).is_input_error());
        assert!(!Error::OutOfMemory.is_input_error());
        assert!(!Error::EncodeFailed {
            format: OutputFormat::Png,
            reason: String::new(),
        }
        .is_input_error());
    }
}
