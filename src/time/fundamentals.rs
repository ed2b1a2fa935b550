//! # Astronomical fundamentals collaborator
//!
//! [`Time`](crate::time::Time) never performs a timescale transformation or a calendar
//! conversion on its own: every numeric routine goes through an implementation of the
//! [`Fundamentals`] trait. The trait follows the status-code convention of the classic
//! fundamental-astronomy libraries:
//!
//! | status | meaning |
//! |---|---|
//! | `0` | success |
//! | `1` | *dubious* result (e.g. a year outside the leap-second table); suppressible |
//! | any other value | failure, reported with the routine name |
//!
//! [`check_status`] turns a status into a [`PrecAstroError::FundamentalsLibraryError`],
//! honouring the caller's `dubious_ok` opt-in.
//!
//! The crate ships [`StandardFundamentals`](crate::time::standard::StandardFundamentals);
//! any other implementation can be injected through the `*_with` methods of `Time`.

use serde::{Deserialize, Serialize};

use crate::{precastro_errors::PrecAstroError, time::TimeScale};

/// Status returned by every fundamentals routine
pub type StatusCode = i32;

/// Routine succeeded
pub const STATUS_OK: StatusCode = 0;

/// Routine succeeded with a dubious result
pub const STATUS_DUBIOUS: StatusCode = 1;

/// Names reported in [`PrecAstroError::FundamentalsLibraryError`]
pub mod routine {
    pub const UTC_TO_TAI: &str = "utc_to_tai";
    pub const TAI_TO_TT: &str = "tai_to_tt";
    pub const CALENDAR_TO_JD: &str = "calendar_to_jd";
    pub const JD_TO_CALENDAR: &str = "jd_to_calendar";
    pub const JD_TO_FIELDS: &str = "jd_to_broken_down_fields";
}

/// A Julian Date split in two parts, `jd1 + jd2`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TwoPartJd {
    pub jd1: f64,
    pub jd2: f64,
}

impl TwoPartJd {
    pub fn new(jd1: f64, jd2: f64) -> Self {
        TwoPartJd { jd1, jd2 }
    }
}

/// Gregorian calendar date with the fraction of the day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub fraction: f64,
}

/// Calendar date and time of day, rounded to a given number of decimal places.
///
/// `fraction` holds the fractional seconds scaled by `10^precision`
/// (e.g. `375` for `.375` with a precision of 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrokenDownTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub fraction: i64,
}

/// Contract of the external fundamentals library.
///
/// All methods are pure numeric transformations. Implementations must be usable from several
/// threads at once, hence the `Send + Sync` bound.
pub trait Fundamentals: Send + Sync {
    /// Convert a two-part JD between timescales.
    fn timescale_convert(
        &self,
        jd: TwoPartJd,
        from: TimeScale,
        to: TimeScale,
    ) -> (StatusCode, TwoPartJd);

    /// Calendar date and time of day in `timescale` to a two-part JD.
    #[allow(clippy::too_many_arguments)]
    fn calendar_to_jd(
        &self,
        timescale: TimeScale,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: f64,
    ) -> (StatusCode, TwoPartJd);

    /// Two-part JD to a Gregorian date and fraction of day.
    fn jd_to_calendar(&self, jd: TwoPartJd) -> (StatusCode, CalendarDate);

    /// Two-part JD to calendar fields, leap-second aware when `timescale` is UTC.
    fn jd_to_broken_down_fields(
        &self,
        timescale: TimeScale,
        precision: i32,
        jd: TwoPartJd,
    ) -> (StatusCode, BrokenDownTime);

    /// Julian epoch (TT, 365.25-day years) to a two-part JD.
    fn julian_epoch_to_jd(&self, epoch: f64) -> TwoPartJd;
}

/// Turn a fundamentals status into a result.
///
/// Arguments
/// ---------
/// * `routine`: name of the routine that produced `code`
/// * `code`: the status code
/// * `dubious_ok`: accept [`STATUS_DUBIOUS`] as a success
///
/// Return
/// ------
/// * `Ok(())` for [`STATUS_OK`], or for [`STATUS_DUBIOUS`] when `dubious_ok` is set
/// * [`PrecAstroError::FundamentalsLibraryError`] otherwise
pub fn check_status(routine: &str, code: StatusCode, dubious_ok: bool) -> Result<(), PrecAstroError> {
    match code {
        STATUS_OK => Ok(()),
        STATUS_DUBIOUS if dubious_ok => Ok(()),
        _ => Err(PrecAstroError::FundamentalsLibraryError {
            routine: routine.to_string(),
            code,
        }),
    }
}
