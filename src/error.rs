//! Error types for mdrender operations.

use thiserror::Error;

/// Errors that can occur while rendering.
///
/// Allocation failure is deliberately absent: output buffers grow through
/// `Vec`, which aborts the process rather than hand back a partial buffer.
#[derive(Error, Debug)]
pub enum Error {
    /// The markdown parser stopped before reaching the end of the input.
    #[error("md parser error: {0}")]
    Parse(String),

    /// The caller asked for an output format that does not exist.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Numeric code reported through the host last-error slot.
    ///
    /// `0` is reserved for "no error".
    pub fn code(&self) -> u32 {
        match self {
            Error::Parse(_) => 1,
            Error::UnsupportedFormat(_) => 2,
            Error::Io(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
