//! Native implementation of the [`Fundamentals`] contract.
//!
//! Supported timescale conversions are UTC → TAI, TAI → TT and TT → TAI; any other pair
//! reports [`STATUS_UNSUPPORTED`]. UTC is handled the usual way: each UTC day is mapped onto
//! one unit of JD, so a day ending with a leap second is 86401 SI seconds long and its
//! seconds are slightly shorter in JD terms.

use crate::{
    constants::{JDTOMJD, SECONDS_PER_DAY, TT_MINUS_TAI},
    time::{
        calendar::{cal2jd, d2tf, epj2jd, jd2cal, next_calendar_day},
        fundamentals::{
            BrokenDownTime, CalendarDate, Fundamentals, StatusCode, TwoPartJd, STATUS_OK,
        },
        leap_seconds::day_length_excess,
        TimeScale,
    },
};

/// Status of [`Fundamentals::timescale_convert`] for a pair of timescales without conversion
pub const STATUS_UNSUPPORTED: StatusCode = -10;

/// Status of [`Fundamentals::jd_to_broken_down_fields`] for a precision outside
/// [`MIN_PRECISION`](crate::time::calendar::MIN_PRECISION)`..=`[`MAX_PRECISION`](crate::time::calendar::MAX_PRECISION)
pub const STATUS_BAD_PRECISION: StatusCode = -2;

/// Default [`Fundamentals`] implementation: calendar arithmetic in pure Rust, TAI − UTC
/// from hifitime's leap second table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFundamentals;

impl StandardFundamentals {
    /// TAI → TT, the offset being applied to the smaller-magnitude part.
    fn tai_to_tt(tai: TwoPartJd) -> TwoPartJd {
        let dtat = TT_MINUS_TAI / SECONDS_PER_DAY;
        if tai.jd1.abs() > tai.jd2.abs() {
            TwoPartJd::new(tai.jd1, tai.jd2 + dtat)
        } else {
            TwoPartJd::new(tai.jd1 + dtat, tai.jd2)
        }
    }

    fn tt_to_tai(tt: TwoPartJd) -> TwoPartJd {
        let dtat = -TT_MINUS_TAI / SECONDS_PER_DAY;
        if tt.jd1.abs() > tt.jd2.abs() {
            TwoPartJd::new(tt.jd1, tt.jd2 + dtat)
        } else {
            TwoPartJd::new(tt.jd1 + dtat, tt.jd2)
        }
    }

    /// UTC → TAI.
    ///
    /// The fraction of the UTC day is stretched by the day's leap second, if any, and the
    /// TAI − UTC of 0h is added. The larger-magnitude part of the input is kept untouched.
    fn utc_to_tai(utc: TwoPartJd) -> (StatusCode, TwoPartJd) {
        let big1 = utc.jd1.abs() >= utc.jd2.abs();
        let (u1, u2) = if big1 {
            (utc.jd1, utc.jd2)
        } else {
            (utc.jd2, utc.jd1)
        };

        let (status, date) = jd2cal(u1, u2);
        if status != STATUS_OK {
            return (status, TwoPartJd::default());
        }

        let (status, (dat0, dleap)) = day_length_excess(date.year, date.month, date.day);
        if status < 0 {
            return (status, TwoPartJd::default());
        }

        let fd = date.fraction * (SECONDS_PER_DAY + dleap) / SECONDS_PER_DAY;

        let (_, mjd0) = cal2jd(date.year, date.month, date.day);
        let mut a2 = JDTOMJD - u1;
        a2 += mjd0;
        a2 += fd + dat0 / SECONDS_PER_DAY;

        let tai = if big1 {
            TwoPartJd::new(u1, a2)
        } else {
            TwoPartJd::new(a2, u1)
        };
        (status, tai)
    }
}

impl Fundamentals for StandardFundamentals {
    fn timescale_convert(
        &self,
        jd: TwoPartJd,
        from: TimeScale,
        to: TimeScale,
    ) -> (StatusCode, TwoPartJd) {
        match (from, to) {
            (from, to) if from == to => (STATUS_OK, jd),
            (TimeScale::UTC, TimeScale::TAI) => Self::utc_to_tai(jd),
            (TimeScale::TAI, TimeScale::TT) => (STATUS_OK, Self::tai_to_tt(jd)),
            (TimeScale::TT, TimeScale::TAI) => (STATUS_OK, Self::tt_to_tai(jd)),
            _ => (STATUS_UNSUPPORTED, TwoPartJd::default()),
        }
    }

    fn calendar_to_jd(
        &self,
        timescale: TimeScale,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: f64,
    ) -> (StatusCode, TwoPartJd) {
        let (status, mjd0) = cal2jd(year, month, day);
        if status != STATUS_OK {
            return (status, TwoPartJd::default());
        }
        let dj = JDTOMJD + mjd0;

        let mut status = STATUS_OK;
        let mut day_length = SECONDS_PER_DAY;
        let mut second_limit = 60.0;

        if timescale == TimeScale::UTC {
            let (dat_status, (_, dleap)) = day_length_excess(year, month, day);
            if dat_status < 0 {
                return (dat_status, TwoPartJd::default());
            }
            status = dat_status;
            day_length += dleap;
            if hour == 23 && minute == 59 {
                second_limit += dleap;
            }
        }

        if !(0..=23).contains(&hour) {
            return (-4, TwoPartJd::default());
        }
        if !(0..=59).contains(&minute) {
            return (-5, TwoPartJd::default());
        }
        if second < 0.0 {
            return (-6, TwoPartJd::default());
        }
        if second >= second_limit {
            status += 2;
        }

        let time = (60.0 * f64::from(60 * hour + minute) + second) / day_length;
        (status, TwoPartJd::new(dj, time))
    }

    fn jd_to_calendar(&self, jd: TwoPartJd) -> (StatusCode, CalendarDate) {
        jd2cal(jd.jd1, jd.jd2)
    }

    fn jd_to_broken_down_fields(
        &self,
        timescale: TimeScale,
        precision: i32,
        jd: TwoPartJd,
    ) -> (StatusCode, BrokenDownTime) {
        let (status, date) = jd2cal(jd.jd1, jd.jd2);
        if status != STATUS_OK {
            return (-1, BrokenDownTime::default());
        }

        let mut status = STATUS_OK;
        let mut fraction = date.fraction;
        let mut leap = false;

        if timescale == TimeScale::UTC {
            let (dat_status, (_, ddt)) = day_length_excess(date.year, date.month, date.day);
            if dat_status < 0 {
                return (-1, BrokenDownTime::default());
            }
            status = dat_status;
            leap = ddt != 0.0;
            if leap {
                fraction += fraction * ddt / SECONDS_PER_DAY;
            }
        }

        let (mut year, mut month, mut day) = (date.year, date.month, date.day);
        let Some((_, mut hmsf)) = d2tf(precision, fraction) else {
            return (STATUS_BAD_PRECISION, BrokenDownTime::default());
        };

        // rounded past 24h
        if hmsf[0] > 23 {
            let tomorrow = next_calendar_day(year, month, day);
            let use_tomorrow = !leap || hmsf[2] > 0 || precision < 0;
            if use_tomorrow {
                (year, month, day) = tomorrow;
                hmsf = [0, 0, 0, 0];
            } else {
                hmsf = [23, 59, 60, hmsf[3]];
            }
        }

        (
            status,
            BrokenDownTime {
                year,
                month,
                day,
                hour: hmsf[0] as i32,
                minute: hmsf[1] as i32,
                second: hmsf[2] as i32,
                fraction: hmsf[3],
            },
        )
    }

    fn julian_epoch_to_jd(&self, epoch: f64) -> TwoPartJd {
        let (djm0, djm) = epj2jd(epoch);
        TwoPartJd::new(djm0, djm)
    }
}

#[cfg(test)]
mod standard_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FUND: StandardFundamentals = StandardFundamentals;

    #[test]
    fn test_calendar_to_jd() {
        let (status, jd) = FUND.calendar_to_jd(TimeScale::UTC, 2000, 1, 1, 12, 0, 0.0);
        assert_eq!(status, 0);
        assert_eq!(jd, TwoPartJd::new(2451544.5, 0.5));

        let (status, jd) = FUND.calendar_to_jd(TimeScale::TT, 1994, 6, 30, 13, 23, 17.5);
        assert_eq!(status, 0);
        assert_abs_diff_eq!(jd.jd1 + jd.jd2, 2449534.057841435, epsilon = 1e-9);
    }

    #[test]
    fn test_calendar_to_jd_status() {
        let check = |ts, y, mo, d, h, mi, s| FUND.calendar_to_jd(ts, y, mo, d, h, mi, s).0;

        assert_eq!(check(TimeScale::TT, -5000, 1, 1, 0, 0, 0.0), -1);
        assert_eq!(check(TimeScale::TT, 2000, 0, 1, 0, 0, 0.0), -2);
        assert_eq!(check(TimeScale::TT, 2000, 2, 30, 0, 0, 0.0), -3);
        assert_eq!(check(TimeScale::TT, 2000, 1, 1, 24, 0, 0.0), -4);
        assert_eq!(check(TimeScale::TT, 2000, 1, 1, 0, 60, 0.0), -5);
        assert_eq!(check(TimeScale::TT, 2000, 1, 1, 0, 0, -1.0), -6);

        // a leap second only exists at the end of a leap second day
        assert_eq!(check(TimeScale::UTC, 2016, 12, 30, 23, 59, 60.5), 2);
        assert_eq!(check(TimeScale::UTC, 2016, 12, 31, 23, 59, 60.5), 0);
        assert_eq!(check(TimeScale::TT, 2016, 12, 31, 23, 59, 60.5), 2);

        assert_eq!(check(TimeScale::UTC, 1900, 1, 1, 0, 0, 0.0), 1);
        assert_eq!(check(TimeScale::UTC, 1900, 1, 1, 0, 0, 61.0), 3);

        // no leap second before UTC is defined
        assert_eq!(check(TimeScale::UTC, 1959, 12, 31, 23, 59, 59.5), 1);
        assert_eq!(check(TimeScale::UTC, 1959, 12, 31, 23, 59, 60.5), 3);
    }

    #[test]
    fn test_utc_to_tai() {
        let (status, tai) = FUND.timescale_convert(
            TwoPartJd::new(2451544.5, 0.5),
            TimeScale::UTC,
            TimeScale::TAI,
        );
        assert_eq!(status, 0);
        assert_eq!(tai.jd1, 2451544.5);
        assert_abs_diff_eq!(tai.jd2, 0.5 + 32.0 / 86400.0, epsilon = 1e-15);

        // operand order is preserved
        let (_, tai) = FUND.timescale_convert(
            TwoPartJd::new(0.5, 2451544.5),
            TimeScale::UTC,
            TimeScale::TAI,
        );
        assert_eq!(tai.jd2, 2451544.5);
        assert_abs_diff_eq!(tai.jd1, 0.5 + 32.0 / 86400.0, epsilon = 1e-15);
    }

    #[test]
    fn test_utc_to_tai_leap_second_day() {
        // 2016-12-31 23:59:60.5 UTC is 2017-01-01 00:00:36.5 TAI
        let (_, utc) = FUND.calendar_to_jd(TimeScale::UTC, 2016, 12, 31, 23, 59, 60.5);
        let (status, tai) = FUND.timescale_convert(utc, TimeScale::UTC, TimeScale::TAI);
        assert_eq!(status, 0);

        let (_, expected) = FUND.calendar_to_jd(TimeScale::TAI, 2017, 1, 1, 0, 0, 36.5);
        assert_abs_diff_eq!(
            (tai.jd1 - expected.jd1) + (tai.jd2 - expected.jd2),
            0.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_tai_tt() {
        let tai = TwoPartJd::new(2453750.5, 0.892482639);
        let (status, tt) = FUND.timescale_convert(tai, TimeScale::TAI, TimeScale::TT);
        assert_eq!(status, 0);
        assert_eq!(tt.jd1, 2453750.5);
        assert_abs_diff_eq!(tt.jd2, 0.892855139, epsilon = 1e-12);

        let (_, back) = FUND.timescale_convert(tt, TimeScale::TT, TimeScale::TAI);
        assert_eq!(back.jd1, tai.jd1);
        assert_abs_diff_eq!(back.jd2, tai.jd2, epsilon = 1e-15);
    }

    #[test]
    fn test_unsupported_conversion() {
        let (status, _) = FUND.timescale_convert(
            TwoPartJd::new(2451545.0, 0.0),
            TimeScale::UT1,
            TimeScale::TT,
        );
        assert_eq!(status, STATUS_UNSUPPORTED);
    }

    #[test]
    fn test_jd_to_broken_down_fields() {
        let (status, fields) = FUND.jd_to_broken_down_fields(
            TimeScale::UTC,
            5,
            TwoPartJd::new(2400000.5, 49533.99999),
        );
        assert_eq!(status, 0);
        assert_eq!(
            fields,
            BrokenDownTime {
                year: 1994,
                month: 6,
                day: 30,
                hour: 23,
                minute: 59,
                second: 60,
                fraction: 13599
            }
        );
    }

    #[test]
    fn test_jd_to_broken_down_fields_rounding() {
        // ordinary day: rounding up past midnight moves to the next day
        let (_, fields) = FUND.jd_to_broken_down_fields(
            TimeScale::TT,
            0,
            TwoPartJd::new(2451544.5, 0.999_999_9),
        );
        assert_eq!(
            (fields.year, fields.month, fields.day, fields.hour),
            (2000, 1, 2, 0)
        );
    }

    #[test]
    fn test_jd_to_broken_down_fields_precision() {
        let jd = TwoPartJd::new(2451544.5, 0.5);
        let (status, fields) = FUND.jd_to_broken_down_fields(TimeScale::TT, 19, jd);
        assert_eq!(status, STATUS_BAD_PRECISION);
        assert_eq!(fields, BrokenDownTime::default());

        let (status, _) = FUND.jd_to_broken_down_fields(TimeScale::UTC, -40, jd);
        assert_eq!(status, STATUS_BAD_PRECISION);
    }

    #[test]
    fn test_julian_epoch_to_jd() {
        let jd = FUND.julian_epoch_to_jd(2000.0);
        assert_eq!(jd, TwoPartJd::new(2400000.5, 51544.5));
    }
}
