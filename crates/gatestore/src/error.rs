//! Error types for gatestore

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for gatestore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening gates or converting entries
///
/// Gate operations themselves never return these; they report through the
/// gate's [`Logger`](crate::Logger) and answer with a miss or `false`.
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Malformed cache entry
    Parse(String),

    /// Text could not be converted into the requested type
    Lexical {
        /// Name of the target type
        target: &'static str,
        /// Offending input
        input: String,
    },

    /// Base64 decode failure of an encoded segment
    Decode(base64::DecodeError),

    /// Key cannot be stored by this gate
    InvalidKey(String),

    /// No unused temporary directory name could be found
    TempDir(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Lexical { target, input } => {
                write!(f, "Cannot convert {:?} into {}", input, target)
            }
            Error::Decode(e) => write!(f, "Decode error: {}", e),
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Error::TempDir(base) => {
                write!(f, "No free temporary directory name under {}", base.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        let msg = match err {
            nom::Err::Incomplete(_) => "incomplete entry".to_string(),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                format!("{:?} at offset of {} trailing bytes", e.code, e.input.len())
            }
        };
        Error::Parse(msg)
    }
}
