//! # JPL ASCII header reader
//!
//! A JPL ASCII ephemeris header (`header.4xx`) is a sequence of numbered groups:
//!
//! ```text
//! KSIZE= 2036    NCOEFF= 1018
//!
//! GROUP   1010
//! JPL Planetary Ephemeris DE405/LE405
//! Start Epoch: JED=  2305424.5 1599 DEC 09 00:00:00
//! Final Epoch: JED=  2525008.5 2201 FEB 20 00:00:00
//!
//! GROUP   1030
//!   2305424.50  2525008.50         32.
//!
//! GROUP   1040
//!    156
//!   DENUM   LENUM   TDATEF  ...
//!
//! GROUP   1041
//!    156
//!   0.405000000000000000D+03  0.405000000000000000D+03 ...
//!
//! GROUP   1050
//!      3   171   231   309   342   366   387   405   423   441   753   819   899
//!     14    10    13    11     8     7     6     6     6    13    11    10    10
//!      4     2     2     1     1     1     1     1     1     8     2     4     4
//!
//! GROUP   1070
//! ```
//!
//! | group | content |
//! |---|---|
//! | 1010 | three title lines |
//! | 1030 | start JD, end JD and block span in days |
//! | 1040 | number of constants, then the constant names |
//! | 1041 | number of constants, then the constant values |
//! | 1050 | interpolation table: 3 rows of 13 integers |
//! | 1070 | end of header |
//!
//! [`EphemerisHeader::read`] walks the lines once and validates the result. Numbers may use
//! FORTRAN `D` exponents (`0.4050D+03`).

use std::io::BufRead;

use itertools::Itertools;
use regex::Regex;
use tracing::debug;

use crate::{
    constants::{CONST_NAME_LEN, INTERP_BODIES, INTERP_ROWS, MAX_CONSTANTS, TITLE_COUNT, TITLE_LEN},
    precastro_errors::PrecAstroError,
};

pub const GROUP_TITLES: u32 = 1010;
pub const GROUP_SPAN: u32 = 1030;
pub const GROUP_CONST_NAMES: u32 = 1040;
pub const GROUP_CONST_VALUES: u32 = 1041;
pub const GROUP_INTERP: u32 = 1050;
pub const GROUP_END: u32 = 1070;

/// Groups a header may contain, in the order they must appear
pub const KNOWN_GROUPS: [u32; 6] = [
    GROUP_TITLES,
    GROUP_SPAN,
    GROUP_CONST_NAMES,
    GROUP_CONST_VALUES,
    GROUP_INTERP,
    GROUP_END,
];

/// Interpolation table: `[offset, coefficient count, sub-interval count]` rows of 13 entries
pub type InterpTable = [[i32; INTERP_BODIES]; INTERP_ROWS];

/// Validated content of a JPL ASCII header.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisHeader {
    /// Record size in 4-byte words
    pub ksize: usize,
    /// The three title lines, right-trimmed
    pub titles: [String; TITLE_COUNT],
    /// Start JD, end JD, block span in days
    pub span: [f64; 3],
    pub const_names: Vec<String>,
    pub const_values: Vec<f64>,
    pub interp: InterpTable,
    /// Astronomical unit in km
    pub au: f64,
    /// Earth/Moon mass ratio
    pub emrat: f64,
    /// DE number of the ephemeris
    pub denum: i32,
}

/// Parse a floating-point token, accepting FORTRAN `D` exponents.
pub fn parse_fortran_float(token: &str) -> Option<f64> {
    token.replace('D', "e").parse().ok()
}

/// Record size, read from columns 7 to 12 of the first header line.
pub fn parse_ksize(first_line: &str) -> Result<usize, PrecAstroError> {
    let end = first_line.len().min(12);
    first_line
        .get(6..end)
        .map(str::trim)
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| {
            PrecAstroError::format(format!(
                "cannot read KSIZE from first header line \"{}\"",
                first_line.trim_end()
            ))
        })
}

/// Accumulated header content while walking through the groups.
#[derive(Debug, Default)]
struct HeaderState {
    group: u32,
    titles: Option<Vec<String>>,
    span: Option<[f64; 3]>,
    nconst_names: Option<usize>,
    const_names: Vec<String>,
    nconst_values: Option<usize>,
    const_values: Vec<f64>,
    interp: Option<Vec<[i32; INTERP_BODIES]>>,
}

impl HeaderState {
    fn enter_group(&mut self, group: u32) -> Result<(), PrecAstroError> {
        if !KNOWN_GROUPS.contains(&group) {
            return Err(PrecAstroError::format(format!("unknown header group {group}")));
        }
        if group <= self.group {
            return Err(PrecAstroError::format(format!(
                "header group {group} found after group {}",
                self.group
            )));
        }
        debug!(from = self.group, to = group, "ephemeris header group");
        self.group = group;
        Ok(())
    }

    fn float_tokens(&self, tokens: &[&str]) -> Result<Vec<f64>, PrecAstroError> {
        tokens
            .iter()
            .map(|token| {
                parse_fortran_float(token).ok_or_else(|| {
                    PrecAstroError::format(format!(
                        "invalid number \"{token}\" in group {}",
                        self.group
                    ))
                })
            })
            .collect()
    }

    fn count_token(&self, tokens: &[&str]) -> Result<usize, PrecAstroError> {
        match tokens {
            [count] => count.parse().map_err(|_| {
                PrecAstroError::format(format!(
                    "invalid count \"{count}\" on first line of group {}",
                    self.group
                ))
            }),
            _ => Err(PrecAstroError::format(format!(
                "expected one int on first line of group {}",
                self.group
            ))),
        }
    }

    fn data_line(&mut self, line: &str, tokens: &[&str]) -> Result<(), PrecAstroError> {
        match self.group {
            GROUP_TITLES => {
                self.titles
                    .get_or_insert_with(Vec::new)
                    .push(line.trim_end().to_string());
            }
            GROUP_SPAN => {
                if self.span.is_some() {
                    return Err(PrecAstroError::format(
                        "expected exactly one data line in group 1030",
                    ));
                }
                let values: [f64; 3] = self
                    .float_tokens(tokens)?
                    .try_into()
                    .map_err(|_| PrecAstroError::format("expected exactly three items in group 1030"))?;
                self.span = Some(values);
            }
            GROUP_CONST_NAMES => {
                if self.nconst_names.is_none() {
                    self.nconst_names = Some(self.count_token(tokens)?);
                } else {
                    self.const_names
                        .extend(tokens.iter().map(|name| name.to_string()));
                }
            }
            GROUP_CONST_VALUES => {
                if self.nconst_values.is_none() {
                    self.nconst_values = Some(self.count_token(tokens)?);
                } else {
                    let values = self.float_tokens(tokens)?;
                    self.const_values.extend(values);
                }
            }
            GROUP_INTERP => {
                let row: [i32; INTERP_BODIES] = tokens
                    .iter()
                    .map(|token| token.parse::<i32>().ok())
                    .collect::<Option<Vec<_>>>()
                    .and_then(|row| row.try_into().ok())
                    .ok_or_else(|| {
                        PrecAstroError::format("expect 13 entries in each line of group 1050")
                    })?;
                self.interp.get_or_insert_with(Vec::new).push(row);
            }
            group => {
                return Err(PrecAstroError::format(format!(
                    "unexpected data in group {group}"
                )))
            }
        }
        Ok(())
    }

    fn finish(self, ksize: usize) -> Result<EphemerisHeader, PrecAstroError> {
        if self.group != GROUP_END {
            return Err(PrecAstroError::format("expected to finish header in group 1070"));
        }

        let titles: [String; TITLE_COUNT] = self
            .titles
            .unwrap_or_default()
            .try_into()
            .map_err(|_| PrecAstroError::format("expected to find exactly 3 titles"))?;
        if titles.iter().any(|title| title.len() > TITLE_LEN) {
            return Err(PrecAstroError::format(
                "each title must be less than 85 characters long",
            ));
        }

        let span = self
            .span
            .ok_or_else(|| PrecAstroError::format("didn't find span info (group 1030)"))?;

        let nconst_names = self.nconst_names.ok_or_else(|| {
            PrecAstroError::format("didn't find constant name info (group 1040)")
        })?;
        if self.const_names.len() != nconst_names {
            return Err(PrecAstroError::format(
                "claimed and actual number of constant names disagree",
            ));
        }
        if nconst_names > MAX_CONSTANTS {
            return Err(PrecAstroError::format("too many constants"));
        }
        if self.const_names.iter().any(|name| name.len() > CONST_NAME_LEN) {
            return Err(PrecAstroError::format(
                "each constant name must be less than 7 characters long",
            ));
        }

        let nconst_values = self.nconst_values.ok_or_else(|| {
            PrecAstroError::format("didn't find constant value info (group 1041)")
        })?;
        if self.const_values.len() != nconst_values {
            return Err(PrecAstroError::format(
                "claimed and actual number of constant values disagree",
            ));
        }
        if nconst_values != nconst_names {
            return Err(PrecAstroError::format(
                "number of constant names and values disagree",
            ));
        }

        let interp: InterpTable = self
            .interp
            .ok_or_else(|| {
                PrecAstroError::format("didn't find interpolation value info (group 1050)")
            })?
            .try_into()
            .map_err(|_| {
                PrecAstroError::format(
                    "expected to find exactly three lines of interpolation value info",
                )
            })?;

        let lookup = |name: &str| {
            self.const_names
                .iter()
                .position(|candidate| candidate == name)
                .map(|index| self.const_values[index])
        };
        let (au, emrat, denum) = (lookup("AU"), lookup("EMRAT"), lookup("DENUM"));
        let (Some(au), Some(emrat), Some(denum)) = (au, emrat, denum) else {
            let missing = [("AU", au), ("EMRAT", emrat), ("DENUM", denum)]
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .join(", ");
            return Err(PrecAstroError::format(format!("missing constant {missing}")));
        };

        Ok(EphemerisHeader {
            ksize,
            titles,
            span,
            const_names: self.const_names,
            const_values: self.const_values,
            interp,
            au,
            emrat,
            denum: denum as i32,
        })
    }
}

impl EphemerisHeader {
    /// Read and validate a JPL ASCII header.
    ///
    /// Arguments
    /// ---------
    /// * `reader`: the header stream, positioned on the `KSIZE` line
    ///
    /// Return
    /// ------
    /// * The validated header, or a [`PrecAstroError::EphemerisFormatError`] describing the first
    ///   problem found
    pub fn read<R: BufRead>(reader: R) -> Result<Self, PrecAstroError> {
        let group_line = Regex::new(r"^GROUP\s+(\S+)")
            .map_err(|err| PrecAstroError::format(err.to_string()))?;

        let mut lines = reader.lines();
        let first_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| PrecAstroError::format("empty ephemeris header"))?;
        let ksize = parse_ksize(&first_line)?;

        let mut state = HeaderState::default();
        for line in lines {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            if let Some(captures) = group_line.captures(&line) {
                let number = &captures[1];
                let group = number.parse().map_err(|_| {
                    PrecAstroError::format(format!("invalid group number \"{number}\""))
                })?;
                state.enter_group(group)?;
                continue;
            }

            state.data_line(&line, &tokens)?;
        }

        state.finish(ksize)
    }
}
