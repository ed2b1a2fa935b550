//! Reader for the header blocks of a compiled (binary) JPL ephemeris.
//!
//! Block 1 layout, all values in native byte order:
//!
//! | offset | content |
//! |---|---|
//! | 0 | 3 titles, 84 bytes each, space padded |
//! | 252 | 400 constant names, 6 bytes each, space padded |
//! | 2652 | start JD, end JD, block span (`f64` ×3) |
//! | 2676 | number of constants (`i32`) |
//! | 2680 | AU, EMRAT (`f64` ×2) |
//! | 2696 | interpolation triples of bodies 1 to 12 (`i32` ×36) |
//! | 2840 | DENUM (`i32`) |
//! | 2844 | interpolation triple of body 13 (`i32` ×3) |
//!
//! Block 2 holds the 400 constant values (`f64`). Both blocks are zero padded to the record
//! size (`KSIZE × 4` bytes).

use std::{fs::File, io::Read};

use camino::Utf8Path;
use nom::{
    bytes::complete::take,
    multi::count,
    number::{complete as number, Endianness},
    IResult, Parser,
};

use crate::{
    constants::{
        CONST_NAME_LEN, HEADER_BLOCK_LEN, INTERP_BODIES, MAX_CONSTANTS, TITLE_COUNT, TITLE_LEN,
    },
    precastro_errors::PrecAstroError,
};

/// Number of components of the quantity interpolated by each row of the table
fn dimension(index: usize) -> usize {
    match index {
        0..=10 => 3, // planets, Moon and Sun
        11 => 2,     // nutations
        12 => 3,     // lunar librations
        _ => 0,
    }
}

/// Index one past the last coefficient of a table row, `None` for values no file can hold.
fn row_end(index: usize, offset: i32, ncoeff: i32, nsub: i32) -> Option<usize> {
    let start = usize::try_from(offset).ok()?.checked_sub(1)?;
    let ncoeff = usize::try_from(ncoeff).ok()?;
    let nsub = usize::try_from(nsub).ok()?;
    ncoeff
        .checked_mul(nsub)?
        .checked_mul(dimension(index))?
        .checked_add(start)
}

/// Header of a compiled ephemeris, as read back from block 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledHeader {
    pub titles: [String; TITLE_COUNT],
    pub const_names: Vec<String>,
    /// Start JD, end JD, block span in days
    pub span: [f64; 3],
    pub au: f64,
    pub emrat: f64,
    /// `[offset, coefficient count, sub-interval count]` for each of the 13 bodies
    pub interp: [[i32; 3]; INTERP_BODIES],
    pub denum: i32,
}

fn native_f64(input: &[u8]) -> IResult<&[u8], f64> {
    number::f64(Endianness::Native)(input)
}

fn native_i32(input: &[u8]) -> IResult<&[u8], i32> {
    number::i32(Endianness::Native)(input)
}

/// Parse a fixed width, space padded text field
fn parse_text(input: &[u8], width: usize) -> IResult<&[u8], String> {
    let (rest, raw) = take(width)(input)?;
    Ok((rest, String::from_utf8_lossy(raw).trim_end().to_string()))
}

fn parse_title(input: &[u8]) -> IResult<&[u8], String> {
    parse_text(input, TITLE_LEN)
}

/// FORTRAN `CHARACTER*6` constant name
fn parse_const_name(input: &[u8]) -> IResult<&[u8], String> {
    parse_text(input, CONST_NAME_LEN)
}

fn parse_triple(input: &[u8]) -> IResult<&[u8], [i32; 3]> {
    let (input, a) = native_i32(input)?;
    let (input, b) = native_i32(input)?;
    let (input, c) = native_i32(input)?;
    Ok((input, [a, b, c]))
}

fn parse_block_one(input: &[u8]) -> IResult<&[u8], (CompiledHeader, i32)> {
    let (input, titles) = count(parse_title, TITLE_COUNT).parse(input)?;
    let (input, names) = count(parse_const_name, MAX_CONSTANTS).parse(input)?;
    let (input, span) = count(native_f64, 3).parse(input)?;
    let (input, ncon) = native_i32(input)?;
    let (input, au) = native_f64(input)?;
    let (input, emrat) = native_f64(input)?;
    let (input, rows) = count(parse_triple, INTERP_BODIES - 1).parse(input)?;
    let (input, denum) = native_i32(input)?;
    let (input, last_row) = parse_triple(input)?;

    let mut interp = [[0; 3]; INTERP_BODIES];
    for (slot, row) in interp.iter_mut().zip(rows.into_iter().chain([last_row])) {
        *slot = row;
    }

    let mut titles = titles.into_iter();
    let titles = [
        titles.next().unwrap_or_default(),
        titles.next().unwrap_or_default(),
        titles.next().unwrap_or_default(),
    ];

    Ok((
        input,
        (
            CompiledHeader {
                titles,
                const_names: names,
                span: [span[0], span[1], span[2]],
                au,
                emrat,
                interp,
                denum,
            },
            ncon,
        ),
    ))
}

impl CompiledHeader {
    /// Parse block 1 of a compiled ephemeris.
    ///
    /// Arguments
    /// ---------
    /// * `block`: at least the first 2856 bytes of the file
    ///
    /// Return
    /// ------
    /// * The header, with only the declared number of constant names kept
    pub fn parse(block: &[u8]) -> Result<Self, PrecAstroError> {
        let (_, (mut header, ncon)) = parse_block_one(block).map_err(|_| {
            PrecAstroError::format(format!(
                "compiled ephemeris header is truncated ({} bytes, expected {HEADER_BLOCK_LEN})",
                block.len()
            ))
        })?;

        let ncon = usize::try_from(ncon)
            .ok()
            .filter(|&n| n <= MAX_CONSTANTS)
            .ok_or_else(|| {
                PrecAstroError::format(format!("invalid number of constants {ncon}"))
            })?;
        header.const_names.truncate(ncon);
        Ok(header)
    }

    /// Read the header of a compiled ephemeris file.
    pub fn read_file(path: &Utf8Path) -> Result<Self, PrecAstroError> {
        let mut block = Vec::with_capacity(HEADER_BLOCK_LEN);
        File::open(path)?
            .take(HEADER_BLOCK_LEN as u64)
            .read_to_end(&mut block)?;
        CompiledHeader::parse(&block)
    }

    /// Number of `f64` values in one data record, derived from the interpolation table.
    ///
    /// Each record starts with its JD bounds, followed by the coefficients of every body.
    /// Rows with no coefficients or no sub-intervals are unused.
    ///
    /// Return
    /// ------
    /// * The record length, or a [`PrecAstroError::EphemerisFormatError`] when a used row has a
    ///   negative or zero offset, a negative count, or describes a record too large to address
    pub fn record_coefficients(&self) -> Result<usize, PrecAstroError> {
        let mut record_len = 2;
        for (index, &[offset, ncoeff, nsub]) in self.interp.iter().enumerate() {
            if ncoeff == 0 || nsub == 0 {
                continue;
            }
            let end = row_end(index, offset, ncoeff, nsub).ok_or_else(|| {
                PrecAstroError::format(format!(
                    "corrupt interpolation table entry {} ({offset}, {ncoeff}, {nsub})",
                    index + 1
                ))
            })?;
            record_len = record_len.max(end);
        }
        Ok(record_len)
    }

    /// Record size in 4-byte words (`KSIZE`).
    pub fn ksize(&self) -> Result<usize, PrecAstroError> {
        self.record_coefficients()?
            .checked_mul(2)
            .ok_or_else(|| PrecAstroError::format("record size overflows KSIZE"))
    }

    /// Constant names paired with the values of block 2.
    pub fn constants(&self, block_two: &[u8]) -> Result<Vec<(String, f64)>, PrecAstroError> {
        let values = parse_constant_values(block_two, self.const_names.len())?;
        Ok(self.const_names.iter().cloned().zip(values).collect())
    }
}

/// Parse the first `ncon` constant values of block 2.
pub fn parse_constant_values(block: &[u8], ncon: usize) -> Result<Vec<f64>, PrecAstroError> {
    let result: IResult<&[u8], Vec<f64>> = count(native_f64, ncon).parse(block);
    result.map(|(_, values)| values).map_err(|_| {
        PrecAstroError::format(format!(
            "constant block is truncated ({} bytes for {ncon} values)",
            block.len()
        ))
    })
}
