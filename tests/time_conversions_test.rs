use approx::assert_abs_diff_eq;
use precastro::{
    precastro_errors::PrecAstroError,
    time::{
        fundamentals::{
            BrokenDownTime, CalendarDate, Fundamentals, StatusCode, TwoPartJd, STATUS_DUBIOUS,
            STATUS_OK,
        },
        standard::StandardFundamentals,
        Time, TimeScale,
    },
};

/// Delegates to the standard implementation but reports every conversion with a fixed status.
struct FlaggedFundamentals {
    status: StatusCode,
}

impl Fundamentals for FlaggedFundamentals {
    fn timescale_convert(
        &self,
        jd: TwoPartJd,
        from: TimeScale,
        to: TimeScale,
    ) -> (StatusCode, TwoPartJd) {
        let (_, result) = StandardFundamentals.timescale_convert(jd, from, to);
        (self.status, result)
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
        let (_, jd) =
            StandardFundamentals.calendar_to_jd(timescale, year, month, day, hour, minute, second);
        (self.status, jd)
    }

    fn jd_to_calendar(&self, jd: TwoPartJd) -> (StatusCode, CalendarDate) {
        let (_, date) = StandardFundamentals.jd_to_calendar(jd);
        (self.status, date)
    }

    fn jd_to_broken_down_fields(
        &self,
        timescale: TimeScale,
        precision: i32,
        jd: TwoPartJd,
    ) -> (StatusCode, BrokenDownTime) {
        let (_, fields) = StandardFundamentals.jd_to_broken_down_fields(timescale, precision, jd);
        (self.status, fields)
    }

    fn julian_epoch_to_jd(&self, epoch: f64) -> TwoPartJd {
        StandardFundamentals.julian_epoch_to_jd(epoch)
    }
}

#[test]
fn test_from_jd_all_timescales() {
    for (index, scale) in TimeScale::ALL.into_iter().enumerate() {
        let jd = 2451545.0 + index as f64 * 0.125;
        let t = Time::from_jd(jd, scale.as_str()).unwrap();
        assert_eq!(t.timescale(), scale);
        assert_eq!(t.as_jd(), jd);
    }
}

#[test]
fn test_invalid_timescale_in_every_factory() {
    let invalid = || PrecAstroError::InvalidTimescale("XYZ".into());
    assert_eq!(Time::from_jd(2451545.0, "XYZ"), Err(invalid()));
    assert_eq!(Time::from_mjd(51544.0, "XYZ"), Err(invalid()));
    assert_eq!(Time::from_two_part_jd(2451545.0, 0.5, "XYZ"), Err(invalid()));
    assert_eq!(
        Time::from_calendar(2000, 1, 1, 0, 0, 0.0, "XYZ", false),
        Err(invalid())
    );
    assert_eq!(invalid().to_string(), "illegal timescale name \"XYZ\"");
}

#[test]
fn test_mjd_round_trip() {
    for mjd in [0.0, 51544.5, 59215.123456789, -678575.0] {
        assert_eq!(Time::from_mjd(mjd, TimeScale::TAI).unwrap().as_mjd(), mjd);
    }
}

#[test]
fn test_calendar_round_trip() {
    let t = Time::from_calendar(2012, 7, 14, 18, 45, 30.0, "TAI", false).unwrap();
    let date = t.as_calendar().unwrap();
    assert_eq!((date.year, date.month, date.day), (2012, 7, 14));
    assert_abs_diff_eq!(
        date.fraction * 86400.0,
        18.0 * 3600.0 + 45.0 * 60.0 + 30.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_dubious_status_suppression() {
    let dubious = FlaggedFundamentals {
        status: STATUS_DUBIOUS,
    };
    let utc = Time::from_jd(2451545.0, "UTC").unwrap();

    assert_eq!(
        utc.as_tt_with(&dubious, false),
        Err(PrecAstroError::FundamentalsLibraryError {
            routine: "utc_to_tai".into(),
            code: 1
        })
    );
    let tt = utc.as_tt_with(&dubious, true).unwrap();
    assert_eq!(tt, utc.as_tt(false).unwrap());

    assert!(utc.format_calendar_with(&dubious, 0, false).is_err());
    assert_eq!(
        utc.format_calendar_with(&dubious, 0, true).unwrap(),
        "2000/01/01 12:00:00"
    );

    // calendar conversion never accepts a dubious status
    assert_eq!(
        utc.as_calendar_with(&dubious),
        Err(PrecAstroError::FundamentalsLibraryError {
            routine: "jd_to_calendar".into(),
            code: 1
        })
    );
}

#[test]
fn test_failure_status_is_never_suppressed() {
    let failing = FlaggedFundamentals { status: -1 };
    let tai = Time::from_jd(2451545.0, "TAI").unwrap();

    assert_eq!(
        tai.as_tt_with(&failing, true),
        Err(PrecAstroError::FundamentalsLibraryError {
            routine: "tai_to_tt".into(),
            code: -1
        })
    );
    assert_eq!(
        Time::from_calendar_with(&failing, 2000, 1, 1, 0, 0, 0.0, "TT", true),
        Err(PrecAstroError::FundamentalsLibraryError {
            routine: "calendar_to_jd".into(),
            code: -1
        })
    );
}

#[test]
fn test_injected_fundamentals_are_used() {
    let ok = FlaggedFundamentals { status: STATUS_OK };
    let t = Time::from_julian_epoch_with(&ok, 2000.0);
    assert_eq!(t.as_jd(), 2451545.0);

    let tdb = t.as_tdb_with(&ok, true).unwrap();
    assert_eq!(tdb.timescale(), TimeScale::TT);
}

#[test]
fn test_format_calendar_precision() {
    let t = Time::from_calendar(2021, 3, 4, 5, 6, 7.891, "TT", false).unwrap();
    assert_eq!(t.format_calendar(3, false).unwrap(), "2021/03/04 05:06:07.891");
    assert_eq!(t.format_calendar(0, false).unwrap(), "2021/03/04 05:06:08");
    assert_eq!(t.format_calendar(6, false).unwrap(), "2021/03/04 05:06:07.891000");
}

#[test]
fn test_leap_second_round_trip() {
    let t = Time::from_calendar(2016, 12, 31, 23, 59, 60.5, "UTC", false).unwrap();
    assert_eq!(t.format_calendar(1, false).unwrap(), "2016/12/31 23:59:60.5");

    let next = Time::from_calendar(2017, 1, 1, 0, 0, 0.0, "UTC", false).unwrap();
    let (a, b) = (t.as_tt(false).unwrap(), next.as_tt(false).unwrap());
    assert_abs_diff_eq!(
        ((b.jd1() - a.jd1()) + (b.jd2() - a.jd2())) * 86400.0,
        0.5,
        epsilon = 1e-5
    );
}
