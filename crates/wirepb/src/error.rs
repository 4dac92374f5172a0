use std::fmt;

/// Errors produced by the public, non-generic wirepb API.
///
/// Internally, coders are parameterized over a [`crate::mode::Mode`] and report
/// bounds failures through `Mode::Result<T>` (an `Option<T>` under `Safe`). This
/// `Error` type is what a caller of the top-level `encode`/`decode` functions
/// sees once that internal signal has been attributed a cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The input was exhausted before a value, length, or field key could be read.
    Truncated,
    /// The output region had no room left for the value being encoded.
    BufferFull,
    /// Bytes claimed to be a string were not valid UTF-8.
    InvalidUtf8,
    /// A varint-encoded enum value did not match any variant of the target type.
    InvalidEnumValue(i64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "input exhausted before a value could be decoded"),
            Error::BufferFull => write!(f, "output region has no room for the encoded value"),
            Error::InvalidUtf8 => write!(f, "string field is not valid UTF-8"),
            Error::InvalidEnumValue(v) => write!(f, "{v} is not a valid enum value"),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for the public wirepb API.
pub type Result<T> = std::result::Result<T, Error>;
