//! # JPL ephemerides
//!
//! This module gathers everything related to the legacy JPL DE ephemeris format:
//!
//! - [`ascii_header`]: reader and validator of the JPL ASCII header (`header.4xx`)
//! - [`compiler`]: ASCII (header + data) to binary compiler
//! - [`binary_header`]: reader of the header blocks of a compiled file
//! - [`EphemerisContext`]: lazily opened, shared handle on a compiled ephemeris, used by
//!   [`Time::as_barycentric`](crate::time::Time::as_barycentric)
//!
//! Chebyshev evaluation of the compiled table is not done here: positions come from a
//! [`PositionEvaluator`] supplied by the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nalgebra::Vector3;
//! use precastro::ephemeris::{Body, EphemerisContext, Origin, PositionEvaluator};
//! use precastro::time::fundamentals::StatusCode;
//!
//! struct Novas;
//!
//! impl PositionEvaluator for Novas {
//!     fn evaluate_position(&self, jd1: f64, jd2: f64, body: Body, origin: Origin)
//!         -> (StatusCode, Vector3<f64>) {
//!         // call into the interpolation library here
//!         (0, Vector3::zeros())
//!     }
//! }
//!
//! let context = EphemerisContext::new("de405.bin", Novas);
//! let info = context.open().unwrap();
//! println!("DE{} covers JD {} to {}", info.denum, info.start_jd, info.end_jd);
//! ```

pub mod ascii_header;
pub mod binary_header;
pub mod compiler;

use std::{env, io};

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
    constants::{AstronomicalUnit, JulianDate},
    precastro_errors::PrecAstroError,
    time::fundamentals::{StatusCode, STATUS_OK},
};

use binary_header::CompiledHeader;

/// Environment variable holding the path of the compiled ephemeris
pub const EPHEMERIS_ENV_VAR: &str = "PRECASTRO_EPHEMERIS";

/// Routine name reported when the position evaluator fails
pub const EVALUATE_POSITION: &str = "evaluate_position";

/// Bodies of a JPL planetary ephemeris, numbered as in the JPL/NOVAS interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Mercury = 1,
    Venus = 2,
    Earth = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Uranus = 7,
    Neptune = 8,
    Pluto = 9,
    Sun = 10,
    Moon = 11,
}

/// Origin of the returned positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    SolarSystemBarycenter = 0,
    SunCenter = 1,
}

/// External collaborator evaluating positions from a compiled ephemeris.
///
/// Implementations return a status (`0` on success) and the position in AU.
pub trait PositionEvaluator: Send + Sync {
    fn evaluate_position(
        &self,
        jd1: f64,
        jd2: f64,
        body: Body,
        origin: Origin,
    ) -> (StatusCode, Vector3<AstronomicalUnit>);
}

/// What an opened ephemeris covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisInfo {
    pub start_jd: JulianDate,
    pub end_jd: JulianDate,
    pub denum: i32,
    /// Record size in 4-byte words, derived from the interpolation table
    pub ksize: usize,
}

/// Shared handle on a compiled ephemeris.
///
/// The file is opened on first use and the result is kept for the lifetime of the context.
/// Opening is thread-safe and happens at most once successfully; a failed open is reported to
/// the caller and attempted again on the next call.
#[derive(Debug)]
pub struct EphemerisContext<P> {
    path: Utf8PathBuf,
    evaluator: P,
    info: OnceCell<EphemerisInfo>,
}

impl<P: PositionEvaluator> EphemerisContext<P> {
    /// Construct a context on the compiled ephemeris at `path`. Nothing is read yet.
    pub fn new(path: impl Into<Utf8PathBuf>, evaluator: P) -> Self {
        EphemerisContext {
            path: path.into(),
            evaluator,
            info: OnceCell::new(),
        }
    }

    /// Construct a context on the file named by the `PRECASTRO_EPHEMERIS` environment variable.
    pub fn from_env(evaluator: P) -> Result<Self, PrecAstroError> {
        let path = env::var(EPHEMERIS_ENV_VAR).map_err(|err| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{EPHEMERIS_ENV_VAR}: {err}"),
            )
        })?;
        Ok(EphemerisContext::new(path, evaluator))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn evaluator(&self) -> &P {
        &self.evaluator
    }

    /// Whether the ephemeris has already been opened successfully.
    pub fn is_open(&self) -> bool {
        self.info.get().is_some()
    }

    /// Open the ephemeris if needed and describe it.
    ///
    /// Return
    /// ------
    /// * The span, DE number and record size read from the file header, or the I/O or format
    ///   error that prevented opening it
    pub fn open(&self) -> Result<&EphemerisInfo, PrecAstroError> {
        self.info.get_or_try_init(|| {
            let header = CompiledHeader::read_file(&self.path)?;
            let info = EphemerisInfo {
                start_jd: header.span[0],
                end_jd: header.span[1],
                denum: header.denum,
                ksize: header.ksize()?,
            };
            debug!(
                path = %self.path,
                denum = info.denum,
                ksize = info.ksize,
                start_jd = info.start_jd,
                end_jd = info.end_jd,
                "ephemeris opened"
            );
            Ok(info)
        })
    }

    /// Position of the Earth relative to the solar system barycenter, in AU.
    ///
    /// Arguments
    /// ---------
    /// * `jd1`, `jd2`: the two-part TDB Julian Date
    pub fn earth_barycentric_position(
        &self,
        jd1: f64,
        jd2: f64,
    ) -> Result<Vector3<AstronomicalUnit>, PrecAstroError> {
        self.open()?;
        let (code, position) = self.evaluator.evaluate_position(
            jd1,
            jd2,
            Body::Earth,
            Origin::SolarSystemBarycenter,
        );
        if code != STATUS_OK {
            return Err(PrecAstroError::EphemerisLibraryError {
                routine: EVALUATE_POSITION.to_string(),
                code,
            });
        }
        Ok(position)
    }
}
