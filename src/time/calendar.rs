//! Proleptic Gregorian calendar arithmetic on two-part Julian Dates.
//!
//! The algorithms are the classic integer ones from
//! "A Machine Algorithm for Processing Calendar Dates" (Fliegel & Van Flandern, 1968),
//! <https://doi.org/10.1145/364096.364097>, valid from −4799 January 1.

use crate::{
    constants::{DAYS_PER_JULIAN_YEAR, JDTOMJD, SECONDS_PER_DAY, T2000},
    time::fundamentals::{CalendarDate, StatusCode, STATUS_OK},
};

/// Earliest year accepted by [`cal2jd`]
pub const MIN_YEAR: i32 = -4799;

/// Range of Julian Dates accepted by [`jd2cal`]
const JD_MIN: f64 = -68_569.5;
const JD_MAX: f64 = 1e9;

/// Precisions accepted by [`d2tf`]: rounding to 10 hours up to nanoseconds
pub const MIN_PRECISION: i32 = -5;
pub const MAX_PRECISION: i32 = 9;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0) && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` of `year`, or `None` for a month outside 1..=12.
pub fn days_in_month(year: i32, month: i32) -> Option<i32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// The calendar day following `(year, month, day)`.
pub fn next_calendar_day(year: i32, month: i32, day: i32) -> (i32, i32, i32) {
    let last = days_in_month(year, month).unwrap_or(31);
    if day < last {
        (year, month, day + 1)
    } else if month < 12 {
        (year, month + 1, 1)
    } else {
        (year + 1, 1, 1)
    }
}

/// Gregorian calendar date to Modified Julian Date at 0h.
///
/// Return
/// ------
/// * `(status, mjd)` where the full JD is [`JDTOMJD`] + `mjd`.
///   Status `-1` bad year, `-2` bad month (no date computed), `-3` bad day (date still computed).
pub fn cal2jd(year: i32, month: i32, day: i32) -> (StatusCode, f64) {
    if year < MIN_YEAR {
        return (-1, 0.0);
    }
    let Some(last_day) = days_in_month(year, month) else {
        return (-2, 0.0);
    };
    let status = if day < 1 || day > last_day {
        -3
    } else {
        STATUS_OK
    };

    let (iy, im, id) = (year as i64, month as i64, day as i64);
    let my = (im - 14) / 12;
    let iypmy = iy + my;
    let mjd = (1461 * (iypmy + 4800)) / 4 + (367 * (im - 2 - 12 * my)) / 12
        - (3 * ((iypmy + 4900) / 100)) / 4
        + id
        - 2_432_076;

    (status, mjd as f64)
}

/// Two-part Julian Date to Gregorian calendar date and fraction of day.
///
/// The fractional parts of both components are summed with compensated summation so that
/// the fraction of day keeps the precision of the two-part representation.
///
/// Return
/// ------
/// * `(status, date)`, status `-1` when `jd1 + jd2` is outside the supported range.
pub fn jd2cal(jd1: f64, jd2: f64) -> (StatusCode, CalendarDate) {
    let dj = jd1 + jd2;
    if !(JD_MIN..=JD_MAX).contains(&dj) {
        return (-1, CalendarDate::default());
    }

    let d1 = jd1.round();
    let f1 = jd1 - d1;
    let mut jd = d1 as i64;
    let d2 = jd2.round();
    let f2 = jd2 - d2;
    jd += d2 as i64;

    // f1 + f2 + 0.5 (Klein 2006)
    let mut s = 0.5;
    let mut cs = 0.0;
    for x in [f1, f2] {
        let t = s + x;
        cs += if f64::abs(s) >= f64::abs(x) {
            (s - t) + x
        } else {
            (x - t) + s
        };
        s = t;
        if s >= 1.0 {
            jd += 1;
            s -= 1.0;
        }
    }
    let mut f = s + cs;
    cs = f - s;

    if f < 0.0 {
        f = s + 1.0;
        cs += (1.0 - f) + s;
        s = f;
        f = s + cs;
        cs = f - s;
        jd -= 1;
    }

    if (f - 1.0) >= -f64::EPSILON / 4.0 {
        let t = s - 1.0;
        cs += (s - t) - 1.0;
        s = t;
        f = s + cs;
        if -f64::EPSILON / 2.0 < f {
            jd += 1;
            f = f.max(0.0);
        }
    }

    let mut l = jd + 68_569;
    let n = (4 * l) / 146_097;
    l -= (146_097 * n + 3) / 4;
    let i = (4000 * (l + 1)) / 1_461_001;
    l -= (1461 * i) / 4 - 31;
    let k = (80 * l) / 2447;
    let day = l - (2447 * k) / 80;
    l = k / 11;
    let month = k + 2 - 12 * l;
    let year = 100 * (n - 49) + i + l;

    (
        STATUS_OK,
        CalendarDate {
            year: year as i32,
            month: month as i32,
            day: day as i32,
            fraction: f,
        },
    )
}

/// Split a fraction of day into hours, minutes, seconds and fractional seconds.
///
/// Arguments
/// ---------
/// * `precision`: number of decimal places of the seconds. Negative values round to
///   10, 60, 600, 3600... seconds (`-1`, `-2`, `-3`, `-4`...).
/// * `days`: the interval in days
///
/// Return
/// ------
/// * `(sign, [hours, minutes, seconds, fraction])`, the fraction being scaled by `10^precision`,
///   or `None` when `precision` is outside [`MIN_PRECISION`]`..=`[`MAX_PRECISION`]
pub fn d2tf(precision: i32, days: f64) -> Option<(char, [i64; 4])> {
    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return None;
    }
    let sign = if days >= 0.0 { '+' } else { '-' };
    let mut a = SECONDS_PER_DAY * days.abs();

    if precision < 0 {
        let mut nrs: i64 = 1;
        for n in 1..=(-precision) {
            nrs *= if n == 2 || n == 4 { 6 } else { 10 };
        }
        let rs = nrs as f64;
        a = rs * (a / rs).round();
    }

    let nrs = 10_i64.pow(precision.max(0) as u32);
    let rs = nrs as f64;
    let rm = rs * 60.0;
    let rh = rm * 60.0;

    a = (rs * a).round();

    let ah = (a / rh).trunc();
    a -= ah * rh;
    let am = (a / rm).trunc();
    a -= am * rm;
    let as_ = (a / rs).trunc();
    let af = a - as_ * rs;

    Some((sign, [ah as i64, am as i64, as_ as i64, af as i64]))
}

/// Julian epoch to a two-part Julian Date `(2400000.5, mjd)`.
pub fn epj2jd(epoch: f64) -> (f64, f64) {
    (JDTOMJD, T2000 + (epoch - 2000.0) * DAYS_PER_JULIAN_YEAR)
}
