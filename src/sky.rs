//! # Sky directions
//!
//! A [`SkyDirection`] is the direction of an observed object, given as right ascension and
//! declination in **radians**. It is all [`Time::as_barycentric`](crate::time::Time::as_barycentric)
//! needs to know about the object.
//!
//! Directions can be given either in radians or as sexagesimal strings through
//! [`RaDecInput`]:
//!
//! ```rust
//! use precastro::sky::{RaDecInput, SkyDirection};
//!
//! let vega = SkyDirection::try_from(RaDecInput::Sexagesimal {
//!     ra: "18 36 56.34".into(),
//!     dec: "+38 47 01.3".into(),
//! })
//! .unwrap();
//! assert!(vega.dec > 0.0);
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Radian},
    precastro_errors::PrecAstroError,
};

/// Direction on the sky, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyDirection {
    /// Right ascension
    pub ra: Radian,
    /// Declination
    pub dec: Radian,
}

impl SkyDirection {
    pub fn new(ra: Radian, dec: Radian) -> Self {
        SkyDirection { ra, dec }
    }

    /// Unit vector pointing at this direction (equatorial frame).
    pub fn unit_vector(&self) -> Vector3<f64> {
        let (sin_ra, cos_ra) = self.ra.sin_cos();
        let (sin_dec, cos_dec) = self.dec.sin_cos();
        Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }
}

/// The ways a sky direction can be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaDecInput {
    /// RA as `"HH MM SS.ss"`, Dec as `"±DD MM SS.ss"`
    Sexagesimal { ra: String, dec: String },
    /// RA and Dec already in radians
    Radians { ra: Radian, dec: Radian },
}

impl TryFrom<RaDecInput> for SkyDirection {
    type Error = PrecAstroError;

    fn try_from(input: RaDecInput) -> Result<Self, Self::Error> {
        match input {
            RaDecInput::Radians { ra, dec } => {
                if !ra.is_finite() || !dec.is_finite() {
                    return Err(PrecAstroError::InvalidCoordinate(format!(
                        "non finite direction ({ra}, {dec})"
                    )));
                }
                Ok(SkyDirection::new(ra, dec))
            }
            RaDecInput::Sexagesimal { ra, dec } => {
                let ra_deg = parse_ra_to_deg(&ra).ok_or_else(|| {
                    PrecAstroError::InvalidCoordinate(format!("right ascension \"{ra}\""))
                })?;
                let dec_deg = parse_dec_to_deg(&dec).ok_or_else(|| {
                    PrecAstroError::InvalidCoordinate(format!("declination \"{dec}\""))
                })?;
                Ok(SkyDirection::new(ra_deg.to_radians(), dec_deg.to_radians()))
            }
        }
    }
}

/// Split a sexagesimal string into its three numeric fields.
fn sexagesimal_fields(value: &str) -> Option<(&str, f64, f64)> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    if !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
        return None;
    }
    Some((parts[0], m, s))
}

/// Parse a right ascension string to degrees
///
/// Arguments
/// ---------
/// * `ra`: a string representing the right ascension in the format `HH MM SS.SS`
///
/// Returns
/// -------
/// * `Option<Degree>`: the right ascension in degrees, `None` if the input format is invalid
pub fn parse_ra_to_deg(ra: &str) -> Option<Degree> {
    let (h_raw, m, s) = sexagesimal_fields(ra)?;
    let h: f64 = h_raw.parse().ok()?;
    if !(0.0..24.0).contains(&h) {
        return None;
    }
    Some((h + m / 60.0 + s / 3600.0) * 15.0)
}

/// Parse a declination string to degrees
///
/// Arguments
/// ---------
/// * `dec`: a string representing the declination in the format `±DD MM SS.SS`
///
/// Returns
/// -------
/// * `Option<Degree>`: the declination in degrees, `None` if the input format is invalid
pub fn parse_dec_to_deg(dec: &str) -> Option<Degree> {
    let (d_raw, m, s) = sexagesimal_fields(dec)?;

    let sign = if d_raw.starts_with('-') { -1.0 } else { 1.0 };
    let d: f64 = d_raw.trim_start_matches(&['-', '+'][..]).parse().ok()?;

    let dec_deg = d + m / 60.0 + s / 3600.0;
    if dec_deg > 90.0 {
        return None;
    }
    Some(sign * dec_deg)
}
