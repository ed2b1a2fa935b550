//! # Constants for precastro
//!
//! This module centralizes the **epochs**, **unit conversions**, and the **fixed sizes of the
//! legacy JPL binary ephemeris layout** used throughout the crate.
//!
//! ## Overview
//!
//! - Julian Date epochs (POSIX epoch, MJD zero point, J2000)
//! - Time unit conversions and the TT−TAI offset
//! - Speed of light expressed in astronomical units per day
//! - Sizes and offsets of the FORTRAN-defined DE binary header

// -------------------------------------------------------------------------------------------------
// Epochs and time units
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian Date of the POSIX epoch (1970-01-01T00:00:00 UTC)
pub const POSIX_EPOCH_JD: f64 = 2_440_587.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51_544.5;

/// Length of a Julian year in days
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// TT − TAI in seconds
pub const TT_MINUS_TAI: f64 = 32.184;

/// Speed of light in astronomical units per day
pub const C_AUDAY: f64 = 173.144_632_684_669_3;

// -------------------------------------------------------------------------------------------------
// Legacy JPL binary ephemeris layout
// -------------------------------------------------------------------------------------------------

/// Width of a title slot in the binary header
pub const TITLE_LEN: usize = 84;

/// Number of title slots in the binary header
pub const TITLE_COUNT: usize = 3;

/// Width of a constant name slot (FORTRAN `CHARACTER*6`)
pub const CONST_NAME_LEN: usize = 6;

/// Number of constant slots in the binary header
pub const MAX_CONSTANTS: usize = 400;

/// Number of bodies/quantities in the interpolation table
pub const INTERP_BODIES: usize = 13;

/// Number of rows in the interpolation table (offset, coefficients, sub-intervals)
pub const INTERP_ROWS: usize = 3;

/// Byte offset of the span information (start JD, end JD, block span)
pub const SPAN_OFFSET: usize = TITLE_COUNT * TITLE_LEN + MAX_CONSTANTS * CONST_NAME_LEN;

/// Byte offset of the interpolation table in the binary header
pub const IPT_OFFSET: usize = SPAN_OFFSET + 3 * 8 + 4 + 2 * 8;

/// Number of meaningful bytes in the first header block
pub const HEADER_BLOCK_LEN: usize = IPT_OFFSET + 3 * 12 * 4 + 4 + 3 * 4;

/// Number of meaningful bytes in the constant-values block
pub const CONST_BLOCK_LEN: usize = MAX_CONSTANTS * 8;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Julian Date (days)
pub type JulianDate = f64;

/// Angle in radians
pub type Radian = f64;

/// Angle in degrees
pub type Degree = f64;

/// Distance in astronomical units
pub type AstronomicalUnit = f64;
