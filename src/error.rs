
//! The error type returned by every fallible operation in this crate.

use std::fmt;

/// A result that may contain a codec error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result with no value. Errors are never fatal:
/// the operation that produced one has left its buffer untouched.
pub type UnitResult = Result<()>;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;


/// An error reported by any operation in this crate.
#[derive(Debug)]
pub enum Error {

    /// The bytes are valid, but outside the supported subset,
    /// for example a BMP image with a bit depth other than 24.
    NotSupported(String),

    /// The bytes contradict themselves,
    /// for example a container whose declared lengths exceed its payload.
    Invalid(String),

    /// A file could not be read or written.
    Io(IoError),
}


impl Error {

    /// Create an error describing contradictory bytes.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Invalid(message.into())
    }

    /// Create an error describing bytes outside the supported subset.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::NotSupported(message.into())
    }
}


/// Enable using the `?` operator on io::Result
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotSupported(message) => write!(formatter, "not supported: {}", message),
            Error::Invalid(message) => write!(formatter, "invalid: {}", message),
            Error::Io(error) => write!(formatter, "io error: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}
