//! # Precise astronomical time
//!
//! This module defines [`Time`], a Julian Date stored in **two parts** (`jd1 + jd2`) and tagged
//! with one of seven astronomical [`TimeScale`]s. The split keeps sub-microsecond precision that
//! a single `f64` Julian Date cannot hold (about 20 µs near J2000).
//!
//! ## Overview
//!
//! - Constructors: [`Time::from_posix`], [`Time::now`], [`Time::from_jd`], [`Time::from_mjd`],
//!   [`Time::from_calendar`], [`Time::from_julian_epoch`]
//! - Conversions: [`Time::as_tt`], [`Time::as_tdb`], [`Time::as_barycentric`]
//! - Output: [`Time::as_jd`], [`Time::as_mjd`], [`Time::as_calendar`], [`Time::format_calendar`]
//!
//! Every calendar or timescale transformation is delegated to a
//! [`Fundamentals`](crate::time::fundamentals::Fundamentals) implementation. Each operation
//! comes in two flavours: `op_with(&fundamentals, ...)` for an injected implementation and
//! `op(...)` which uses [`StandardFundamentals`].
//!
//! ## UTC and leap seconds
//!
//! UTC has no well-defined behaviour regarding leap seconds. On a day ending with a leap
//! second, UTC Julian Dates progress at a different rate than on other days, and the POSIX
//! mapping `jd2 = seconds / 86400` used by [`Time::from_posix`] does not track elapsed time
//! either. Precise measurements, and any arithmetic on [`Time`] values, should avoid UTC.
//! The only safe way to interchange UTC times is in broken-down calendar form, where a leap
//! second can be written as `23:59:60.375`.
//!
//! ## Example
//!
//! ```rust
//! use precastro::time::{Time, TimeScale};
//!
//! let t = Time::from_calendar(2000, 1, 1, 12, 0, 0.0, "UTC", false).unwrap();
//! assert_eq!(t.as_jd(), 2451545.0);
//!
//! let tt = t.as_tt(false).unwrap();
//! assert_eq!(tt.timescale(), TimeScale::TT);
//! assert_eq!(t.format_calendar(3, false).unwrap(), "2000/01/01 12:00:00.000");
//! ```

pub mod calendar;
pub mod fundamentals;
pub mod leap_seconds;
pub mod standard;

use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{C_AUDAY, JDTOMJD, POSIX_EPOCH_JD, SECONDS_PER_DAY},
    ephemeris::{EphemerisContext, PositionEvaluator},
    precastro_errors::PrecAstroError,
    sky::SkyDirection,
};

use fundamentals::{check_status, routine, CalendarDate, Fundamentals, TwoPartJd};
use standard::StandardFundamentals;

/// Astronomical timescales a [`Time`] can be measured in.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    /// International Atomic Time
    TAI,
    /// Coordinated Universal Time
    UTC,
    /// Universal Time, Earth rotation angle based
    UT1,
    /// Terrestrial Time
    TT,
    /// Geocentric Coordinate Time
    TCG,
    /// Barycentric Coordinate Time
    TCB,
    /// Barycentric Dynamical Time
    TDB,
}

impl TimeScale {
    pub const ALL: [TimeScale; 7] = [
        TimeScale::TAI,
        TimeScale::UTC,
        TimeScale::UT1,
        TimeScale::TT,
        TimeScale::TCG,
        TimeScale::TCB,
        TimeScale::TDB,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeScale::TAI => "TAI",
            TimeScale::UTC => "UTC",
            TimeScale::UT1 => "UT1",
            TimeScale::TT => "TT",
            TimeScale::TCG => "TCG",
            TimeScale::TCB => "TCB",
            TimeScale::TDB => "TDB",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeScale {
    type Err = PrecAstroError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TimeScale::ALL
            .into_iter()
            .find(|scale| scale.as_str() == name)
            .ok_or_else(|| PrecAstroError::InvalidTimescale(name.to_string()))
    }
}

impl TryFrom<&str> for TimeScale {
    type Error = PrecAstroError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Resolve any timescale designation (a [`TimeScale`] or its name).
fn resolve_timescale<S>(timescale: S) -> Result<TimeScale, PrecAstroError>
where
    S: TryInto<TimeScale>,
    PrecAstroError: From<S::Error>,
{
    Ok(timescale.try_into()?)
}

/// A precisely-measured time and its associated timescale.
///
/// Values are immutable: every conversion returns a new [`Time`] and leaves the source usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Time {
    jd1: f64,
    jd2: f64,
    timescale: TimeScale,
}

impl Time {
    /// Build a time from an already split Julian Date.
    pub fn from_two_part_jd<S>(jd1: f64, jd2: f64, timescale: S) -> Result<Self, PrecAstroError>
    where
        S: TryInto<TimeScale>,
        PrecAstroError: From<S::Error>,
    {
        Ok(Time {
            jd1,
            jd2,
            timescale: resolve_timescale(timescale)?,
        })
    }

    /// The time represented by a POSIX/Unix timestamp, in UTC.
    ///
    /// POSIX time and UTC are both ambiguous around leap seconds, and in ways that do not
    /// cancel: on a leap second day the result can be off by up to one second.
    pub fn from_posix(seconds: f64) -> Self {
        Time {
            jd1: POSIX_EPOCH_JD,
            jd2: seconds / SECONDS_PER_DAY,
            timescale: TimeScale::UTC,
        }
    }

    /// The current time according to the system clock, in UTC.
    ///
    /// Goes through POSIX time, so it has ~1 second precision on leap second days.
    pub fn now() -> Self {
        let seconds = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs_f64(),
            Err(before) => -before.duration().as_secs_f64(),
        };
        Time::from_posix(seconds)
    }

    /// The given Julian Date in the given timescale.
    ///
    /// Storing a JD as a single float limits precision to about 20 microseconds.
    pub fn from_jd<S>(jd: f64, timescale: S) -> Result<Self, PrecAstroError>
    where
        S: TryInto<TimeScale>,
        PrecAstroError: From<S::Error>,
    {
        Time::from_two_part_jd(jd, 0.0, timescale)
    }

    /// The given Modified Julian Date (JD − 2400000.5) in the given timescale.
    pub fn from_mjd<S>(mjd: f64, timescale: S) -> Result<Self, PrecAstroError>
    where
        S: TryInto<TimeScale>,
        PrecAstroError: From<S::Error>,
    {
        Time::from_two_part_jd(JDTOMJD, mjd, timescale)
    }

    /// The given proleptic Gregorian calendar date and time of day.
    ///
    /// Valid from −4799 January 1. `second` ranges over `0.0..61.0` so that a UTC leap second
    /// (`23:59:60.x`) can be expressed; this is the only constructor that handles UTC leap
    /// seconds correctly.
    ///
    /// Arguments
    /// ---------
    /// * `year`, `month`, `day`, `hour`, `minute`, `second`: the calendar fields
    /// * `timescale`: the timescale of the fields
    /// * `dubious_ok`: accept dates the fundamentals library flags as dubious
    ///   (e.g. UTC outside the leap second table)
    ///
    /// Return
    /// ------
    /// * The time, [`PrecAstroError::InvalidTimescale`] for an unknown timescale, or
    ///   [`PrecAstroError::FundamentalsLibraryError`] for bad fields
    #[allow(clippy::too_many_arguments)]
    pub fn from_calendar<S>(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: f64,
        timescale: S,
        dubious_ok: bool,
    ) -> Result<Self, PrecAstroError>
    where
        S: TryInto<TimeScale>,
        PrecAstroError: From<S::Error>,
    {
        Time::from_calendar_with(
            &StandardFundamentals,
            year,
            month,
            day,
            hour,
            minute,
            second,
            timescale,
            dubious_ok,
        )
    }

    /// [`Time::from_calendar`] with an injected fundamentals library.
    #[allow(clippy::too_many_arguments)]
    pub fn from_calendar_with<F, S>(
        fundamentals: &F,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: f64,
        timescale: S,
        dubious_ok: bool,
    ) -> Result<Self, PrecAstroError>
    where
        F: Fundamentals + ?Sized,
        S: TryInto<TimeScale>,
        PrecAstroError: From<S::Error>,
    {
        let timescale = resolve_timescale(timescale)?;
        let (code, jd) =
            fundamentals.calendar_to_jd(timescale, year, month, day, hour, minute, second);
        check_status(routine::CALENDAR_TO_JD, code, dubious_ok)?;
        Ok(Time {
            jd1: jd.jd1,
            jd2: jd.jd2,
            timescale,
        })
    }

    /// The given Julian epoch (e.g. `2005.37`), in TT.
    ///
    /// A Julian epoch counts years of exactly 365.25 days.
    pub fn from_julian_epoch(epoch: f64) -> Self {
        Time::from_julian_epoch_with(&StandardFundamentals, epoch)
    }

    /// [`Time::from_julian_epoch`] with an injected fundamentals library.
    pub fn from_julian_epoch_with<F: Fundamentals + ?Sized>(fundamentals: &F, epoch: f64) -> Self {
        let jd = fundamentals.julian_epoch_to_jd(epoch);
        Time {
            jd1: jd.jd1,
            jd2: jd.jd2,
            timescale: TimeScale::TT,
        }
    }

    pub fn jd1(&self) -> f64 {
        self.jd1
    }

    pub fn jd2(&self) -> f64 {
        self.jd2
    }

    pub fn timescale(&self) -> TimeScale {
        self.timescale
    }

    fn two_part(&self) -> TwoPartJd {
        TwoPartJd::new(self.jd1, self.jd2)
    }

    fn with_jd(jd: TwoPartJd, timescale: TimeScale) -> Self {
        Time {
            jd1: jd.jd1,
            jd2: jd.jd2,
            timescale,
        }
    }

    /// The time as a single Julian Date.
    ///
    /// Collapsing the two parts limits precision to about 20 microseconds.
    pub fn as_jd(&self) -> f64 {
        self.jd1 + self.jd2
    }

    /// The time as a Modified Julian Date.
    ///
    /// Slightly more precise than [`Time::as_jd`], though the gain is small.
    pub fn as_mjd(&self) -> f64 {
        (self.jd1 - JDTOMJD) + self.jd2
    }

    /// An equivalent time in TT.
    ///
    /// TT is copied, TAI takes one conversion and UTC two (UTC → TAI → TT). Each step is
    /// checked; `dubious_ok` accepts dates outside the leap second table.
    ///
    /// Return
    /// ------
    /// * The TT time, [`PrecAstroError::UnsupportedTimescale`] for any other source timescale,
    ///   or [`PrecAstroError::FundamentalsLibraryError`] for an unacceptable date
    pub fn as_tt(&self, dubious_ok: bool) -> Result<Self, PrecAstroError> {
        self.as_tt_with(&StandardFundamentals, dubious_ok)
    }

    /// [`Time::as_tt`] with an injected fundamentals library.
    pub fn as_tt_with<F: Fundamentals + ?Sized>(
        &self,
        fundamentals: &F,
        dubious_ok: bool,
    ) -> Result<Self, PrecAstroError> {
        let tt = match self.timescale {
            TimeScale::TT => self.two_part(),
            TimeScale::TAI => {
                let (code, tt) =
                    fundamentals.timescale_convert(self.two_part(), TimeScale::TAI, TimeScale::TT);
                check_status(routine::TAI_TO_TT, code, dubious_ok)?;
                tt
            }
            TimeScale::UTC => {
                let (code, tai) =
                    fundamentals.timescale_convert(self.two_part(), TimeScale::UTC, TimeScale::TAI);
                check_status(routine::UTC_TO_TAI, code, dubious_ok)?;
                let (code, tt) = fundamentals.timescale_convert(tai, TimeScale::TAI, TimeScale::TT);
                check_status(routine::TAI_TO_TT, code, dubious_ok)?;
                tt
            }
            other => return Err(PrecAstroError::UnsupportedTimescale(other)),
        };
        Ok(Time::with_jd(tt, TimeScale::TT))
    }

    /// An equivalent time in TDB.
    ///
    /// TDB is copied. Otherwise, when `tt_ok` is set, TT is accepted as close enough
    /// (~2 ms difference) and the result of [`Time::as_tt`] is returned: its timescale is then
    /// **TT**, not TDB.
    pub fn as_tdb(&self, tt_ok: bool) -> Result<Self, PrecAstroError> {
        self.as_tdb_with(&StandardFundamentals, tt_ok)
    }

    /// [`Time::as_tdb`] with an injected fundamentals library.
    pub fn as_tdb_with<F: Fundamentals + ?Sized>(
        &self,
        fundamentals: &F,
        tt_ok: bool,
    ) -> Result<Self, PrecAstroError> {
        if self.timescale == TimeScale::TDB {
            return Ok(*self);
        }
        if !tt_ok {
            return Err(PrecAstroError::UnsupportedTimescale(self.timescale));
        }
        self.as_tt_with(fundamentals, false)
    }

    /// A time adjusted to the solar system barycenter, correcting for the light travel time
    /// along the direction of `object`.
    ///
    /// The result is in TDB, or TT when `tt_ok` is set and TDB is not available.
    ///
    /// Accuracy is about 0.1 s. Effects that are not accounted for include:
    ///
    /// * Rømer delay for solar system sources: up to ~100 s
    /// * observatory site rather than geocenter: 8–22 ms
    /// * proper TT to TDB conversion: ~2 ms
    /// * Einstein term: ~1 ms
    /// * TT(BIPM) instead of TT(TAI): ~30 µs
    /// * observatory elevation: ~10 µs
    /// * Shapiro delay: ~1 µs
    /// * Earth orientation parameters: ~1 µs
    /// * ITRF observatory site: ~30 ns
    /// * integrated rather than approximate TT to TDB conversion: ~20 ns
    ///
    /// Arguments
    /// ---------
    /// * `context`: the ephemeris context, opened on first use
    /// * `object`: the direction of the observed object
    /// * `tt_ok`: accept TT in place of TDB
    pub fn as_barycentric<P: PositionEvaluator>(
        &self,
        context: &EphemerisContext<P>,
        object: &SkyDirection,
        tt_ok: bool,
    ) -> Result<Self, PrecAstroError> {
        self.as_barycentric_with(&StandardFundamentals, context, object, tt_ok)
    }

    /// [`Time::as_barycentric`] with an injected fundamentals library.
    pub fn as_barycentric_with<F, P>(
        &self,
        fundamentals: &F,
        context: &EphemerisContext<P>,
        object: &SkyDirection,
        tt_ok: bool,
    ) -> Result<Self, PrecAstroError>
    where
        F: Fundamentals + ?Sized,
        P: PositionEvaluator,
    {
        let mut tdb = self.as_tdb_with(fundamentals, tt_ok)?;
        let earth = context.earth_barycentric_position(tdb.jd1, tdb.jd2)?;
        let delta = earth.dot(&object.unit_vector()) / C_AUDAY;
        tdb.jd2 += delta;
        Ok(tdb)
    }

    /// The time as a Gregorian calendar date and fraction of day.
    pub fn as_calendar(&self) -> Result<CalendarDate, PrecAstroError> {
        self.as_calendar_with(&StandardFundamentals)
    }

    /// [`Time::as_calendar`] with an injected fundamentals library.
    pub fn as_calendar_with<F: Fundamentals + ?Sized>(
        &self,
        fundamentals: &F,
    ) -> Result<CalendarDate, PrecAstroError> {
        let (code, date) = fundamentals.jd_to_calendar(self.two_part());
        check_status(routine::JD_TO_CALENDAR, code, false)?;
        Ok(date)
    }

    /// Format the time as `YYYY/MM/DD HH:MM:SS.SSS`.
    ///
    /// `precision` is the number of decimal places of the seconds; below one, the decimal
    /// point and fraction are omitted. Negative precisions round to 10 s, 1 min, 10 min, 1 h
    /// but still print every field. A UTC leap second prints as `23:59:60`.
    pub fn format_calendar(&self, precision: i32, dubious_ok: bool) -> Result<String, PrecAstroError> {
        self.format_calendar_with(&StandardFundamentals, precision, dubious_ok)
    }

    /// [`Time::format_calendar`] with an injected fundamentals library.
    pub fn format_calendar_with<F: Fundamentals + ?Sized>(
        &self,
        fundamentals: &F,
        precision: i32,
        dubious_ok: bool,
    ) -> Result<String, PrecAstroError> {
        let (code, f) =
            fundamentals.jd_to_broken_down_fields(self.timescale, precision, self.two_part());
        check_status(routine::JD_TO_FIELDS, code, dubious_ok)?;

        let fraction = if precision < 1 {
            String::new()
        } else {
            format!(".{:0width$}", f.fraction, width = precision as usize)
        };

        Ok(format!(
            "{}/{:02}/{:02} {:02}:{:02}:{:02}{}",
            f.year, f.month, f.day, f.hour, f.minute, f.second, fraction
        ))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {} + {} {}", self.jd1, self.jd2, self.timescale)
    }
}

/// The current time from the system clock, shorthand for [`Time::now`].
pub fn now() -> Time {
    Time::now()
}
