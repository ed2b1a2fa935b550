//! TAI − UTC lookup backed by hifitime's leap second table.
//!
//! hifitime carries the IERS leap second list plus the pre-1972 steps. The drift terms of
//! the 1960–1972 "rubber second" era are not modelled, so UTC in that era is only
//! approximate; such dates, and dates too far past the table, are reported as dubious.

use hifitime::Epoch;

use crate::time::{
    calendar::next_calendar_day,
    fundamentals::{StatusCode, STATUS_DUBIOUS, STATUS_OK},
};

/// First year with a defined TAI − UTC
pub const FIRST_UTC_YEAR: i32 = 1960;

/// Reference year of the leap second table.
///
/// Dates more than [`LEAP_TABLE_VALIDITY_YEARS`] later are flagged as dubious, since
/// unannounced leap seconds may have occurred by then.
pub const LEAP_TABLE_YEAR: i32 = 2023;

/// Number of years past [`LEAP_TABLE_YEAR`] trusted without warning
pub const LEAP_TABLE_VALIDITY_YEARS: i32 = 5;

/// TAI − UTC in seconds at 0h UTC of the given date.
///
/// Arguments
/// ---------
/// * `year`, `month`, `day`: a valid Gregorian calendar date
///
/// Return
/// ------
/// * `(status, seconds)`: status [`STATUS_DUBIOUS`] before [`FIRST_UTC_YEAR`] (seconds is then 0)
///   or past the table validity, [`STATUS_OK`] otherwise
pub fn tai_minus_utc(year: i32, month: i32, day: i32) -> (StatusCode, f64) {
    if year < FIRST_UTC_YEAR {
        return (STATUS_DUBIOUS, 0.0);
    }

    let last_trusted = LEAP_TABLE_YEAR + LEAP_TABLE_VALIDITY_YEARS;
    let (status, query) = if year > last_trusted {
        // no leap second can be known after the table end: any date past it gives the same answer
        (STATUS_DUBIOUS, (last_trusted + 1, 1, 1))
    } else {
        (STATUS_OK, (year, month, day))
    };

    let epoch = Epoch::from_gregorian_utc_at_midnight(query.0, query.1 as u8, query.2 as u8);
    (status, epoch.leap_seconds(false).unwrap_or(0.0))
}

/// Extra length, in seconds, of the UTC day `(year, month, day)`.
///
/// This is `+1` on a day ending with a positive leap second and `0` on ordinary days. Days
/// starting before [`FIRST_UTC_YEAR`] have no defined TAI − UTC, so their excess is `0`.
///
/// Return
/// ------
/// * `(status, (tai_minus_utc_at_0h, excess))`, status as in [`tai_minus_utc`]
pub fn day_length_excess(year: i32, month: i32, day: i32) -> (StatusCode, (f64, f64)) {
    let (status, dat0) = tai_minus_utc(year, month, day);
    if year < FIRST_UTC_YEAR {
        return (status, (dat0, 0.0));
    }
    let (ny, nm, nd) = next_calendar_day(year, month, day);
    let (next_status, dat24) = tai_minus_utc(ny, nm, nd);

    let status = if status != STATUS_OK {
        status
    } else {
        next_status
    };
    (status, (dat0, dat24 - dat0))
}
