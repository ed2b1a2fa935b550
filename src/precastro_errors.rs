use std::convert::Infallible;

use thiserror::Error;

use crate::time::TimeScale;

#[derive(Error, Debug)]
pub enum PrecAstroError {
    #[error("illegal timescale name \"{0}\"")]
    InvalidTimescale(String),

    #[error("operation not supported with timescale {0}")]
    UnsupportedTimescale(TimeScale),

    #[error("fundamentals library error code #{code} in routine {routine}")]
    FundamentalsLibraryError { routine: String, code: i32 },

    #[error("ephemeris library error code #{code} in routine {routine}")]
    EphemerisLibraryError { routine: String, code: i32 },

    #[error("{0}")]
    EphemerisFormatError(String),

    #[error("Invalid sky coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PrecAstroError {
    /// Shorthand for building an [`PrecAstroError::EphemerisFormatError`].
    pub(crate) fn format(message: impl Into<String>) -> Self {
        PrecAstroError::EphemerisFormatError(message.into())
    }
}

impl From<Infallible> for PrecAstroError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl PartialEq for PrecAstroError {
    fn eq(&self, other: &Self) -> bool {
        use PrecAstroError::*;
        match (self, other) {
            (InvalidTimescale(a), InvalidTimescale(b)) => a == b,
            (UnsupportedTimescale(a), UnsupportedTimescale(b)) => a == b,
            (
                FundamentalsLibraryError {
                    routine: r1,
                    code: c1,
                },
                FundamentalsLibraryError {
                    routine: r2,
                    code: c2,
                },
            ) => r1 == r2 && c1 == c2,
            (
                EphemerisLibraryError {
                    routine: r1,
                    code: c1,
                },
                EphemerisLibraryError {
                    routine: r2,
                    code: c2,
                },
            ) => r1 == r2 && c1 == c2,
            (EphemerisFormatError(a), EphemerisFormatError(b)) => a == b,
            (InvalidCoordinate(a), InvalidCoordinate(b)) => a == b,

            // I/O errors are not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
