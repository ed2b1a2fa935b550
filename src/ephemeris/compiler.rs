//! # JPL ASCII ephemeris compiler
//!
//! Turns a JPL ASCII ephemeris (a header file and a data file) into the fixed-layout binary
//! format read by the FORTRAN/C Chebyshev interpolation libraries.
//!
//! ## Output layout
//!
//! | block | content |
//! |---|---|
//! | 1 | titles, constant names, span, AU, EMRAT, interpolation table, DENUM (see [`binary_header`](crate::ephemeris::binary_header)) |
//! | 2 | the 400 constant value slots |
//! | 3.. | one block per data record: the `NCOEFF` coefficients as `f64` |
//!
//! Every block is `KSIZE × 4` bytes long and every value is written in native byte order.
//!
//! ## Data file
//!
//! Each record starts with a line `record_number coefficient_count`, followed by lines of
//! coefficients (three per line in JPL files, FORTRAN `D` exponents accepted). The last line of
//! a record is zero padded to three values; the padding is discarded. Record numbers and the JD
//! bounds stored in the coefficients are not checked.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::{fs::File, io::BufReader};
//! use precastro::ephemeris::compiler::compile;
//!
//! let header = BufReader::new(File::open("header.405").unwrap());
//! let data = BufReader::new(File::open("ascp2000.405").unwrap());
//! let binary = compile(header, data).unwrap();
//! std::fs::write("de405.bin", binary).unwrap();
//! ```

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::{
    constants::{CONST_BLOCK_LEN, CONST_NAME_LEN, HEADER_BLOCK_LEN, MAX_CONSTANTS, TITLE_LEN},
    ephemeris::ascii_header::{parse_fortran_float, EphemerisHeader},
    precastro_errors::PrecAstroError,
};

/// Which titles fill the three title slots of block 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleLayout {
    /// Titles 1, 2 and 3, as JPL's own converter writes them
    #[default]
    Independent,
    /// Titles 1, 2 and 2, as older converters wrote them
    DuplicateSecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerConfig {
    pub title_layout: TitleLayout,
}

/// What a successful compilation wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompileSummary {
    pub ksize: usize,
    pub record_count: usize,
    pub denum: i32,
    pub span: [f64; 3],
}

/// Append `text` to `block`, space padded to `width` bytes.
fn push_padded(block: &mut Vec<u8>, text: &str, width: usize) {
    block.extend_from_slice(text.as_bytes());
    block.resize(block.len() + width.saturating_sub(text.len()), b' ');
}

/// Zero pad `block` to the record length, failing if it does not fit.
fn pad_block(mut block: Vec<u8>, block_len: usize, what: &str) -> Result<Vec<u8>, PrecAstroError> {
    if block.len() > block_len {
        return Err(PrecAstroError::format(format!(
            "KSIZE too small: {what} needs {} bytes, records are {block_len} bytes",
            block.len()
        )));
    }
    block.resize(block_len, 0);
    Ok(block)
}

/// Block 1: titles, names, span, AU, EMRAT, interpolation table and DENUM.
fn header_block(header: &EphemerisHeader, layout: TitleLayout) -> Result<Vec<u8>, PrecAstroError> {
    let mut block = Vec::with_capacity(HEADER_BLOCK_LEN);

    let titles = match layout {
        TitleLayout::Independent => [&header.titles[0], &header.titles[1], &header.titles[2]],
        TitleLayout::DuplicateSecond => [&header.titles[0], &header.titles[1], &header.titles[1]],
    };
    for title in titles {
        push_padded(&mut block, title, TITLE_LEN);
    }

    for name in &header.const_names {
        push_padded(&mut block, name, CONST_NAME_LEN);
    }
    let unused = MAX_CONSTANTS - header.const_names.len();
    block.resize(block.len() + unused * CONST_NAME_LEN, b' ');

    for value in header.span {
        block.extend_from_slice(&value.to_ne_bytes());
    }
    block.extend_from_slice(&(header.const_names.len() as i32).to_ne_bytes());
    block.extend_from_slice(&header.au.to_ne_bytes());
    block.extend_from_slice(&header.emrat.to_ne_bytes());

    let [offsets, ncoeffs, nsubs] = &header.interp;
    for body in 0..12 {
        for value in [offsets[body], ncoeffs[body], nsubs[body]] {
            block.extend_from_slice(&value.to_ne_bytes());
        }
    }
    block.extend_from_slice(&header.denum.to_ne_bytes());
    for value in [offsets[12], ncoeffs[12], nsubs[12]] {
        block.extend_from_slice(&value.to_ne_bytes());
    }

    pad_block(block, header.ksize * 4, "the header block")
}

/// Block 2: the constant values, zero filled up to 400 slots.
fn constants_block(header: &EphemerisHeader) -> Result<Vec<u8>, PrecAstroError> {
    let mut block = Vec::with_capacity(CONST_BLOCK_LEN);
    for value in &header.const_values {
        block.extend_from_slice(&value.to_ne_bytes());
    }
    block.resize(CONST_BLOCK_LEN, 0);
    pad_block(block, header.ksize * 4, "the constants block")
}

/// Record currently being accumulated from the data file.
struct PendingRecord {
    number: i64,
    ncoeff: usize,
    coefficients: Vec<f64>,
}

/// Streams data records to the output as soon as they are complete.
struct RecordWriter<W> {
    output: W,
    ksize: usize,
    pending: Option<PendingRecord>,
    record_count: usize,
    buffer: Vec<u8>,
}

impl<W: Write> RecordWriter<W> {
    fn new(output: W, ksize: usize) -> Self {
        RecordWriter {
            output,
            ksize,
            pending: None,
            record_count: 0,
            buffer: Vec::with_capacity(ksize * 4),
        }
    }

    fn start_record(&mut self, tokens: &[&str]) -> Result<(), PrecAstroError> {
        let (number, ncoeff) = match tokens {
            [number, ncoeff, ..] => (number.parse::<i64>().ok(), ncoeff.parse::<usize>().ok()),
            _ => (None, None),
        };
        let (Some(number), Some(ncoeff)) = (number, ncoeff) else {
            return Err(PrecAstroError::format(format!(
                "invalid data record header \"{}\"",
                tokens.join(" ")
            )));
        };

        if ncoeff.checked_mul(2) != Some(self.ksize) {
            return Err(PrecAstroError::format(
                "number of data coefficients doesn't match header: mismatched files?",
            ));
        }

        self.pending = Some(PendingRecord {
            number,
            ncoeff,
            coefficients: Vec::with_capacity(ncoeff + 2),
        });
        Ok(())
    }

    fn coefficient_line(
        &mut self,
        mut record: PendingRecord,
        tokens: &[&str],
    ) -> Result<(), PrecAstroError> {
        for token in tokens {
            let value = parse_fortran_float(token).ok_or_else(|| {
                PrecAstroError::format(format!(
                    "invalid coefficient \"{token}\" in data record {}",
                    record.number
                ))
            })?;
            record.coefficients.push(value);
        }

        if record.coefficients.len() >= record.ncoeff {
            self.write_record(record)
        } else {
            self.pending = Some(record);
            Ok(())
        }
    }

    fn write_record(&mut self, record: PendingRecord) -> Result<(), PrecAstroError> {
        self.buffer.clear();
        for value in &record.coefficients[..record.ncoeff] {
            self.buffer.extend_from_slice(&value.to_ne_bytes());
        }
        self.output.write_all(&self.buffer)?;
        self.record_count += 1;
        if self.record_count % 1000 == 0 {
            debug!(records = self.record_count, "ephemeris records written");
        }
        Ok(())
    }

    fn line(&mut self, line: &str) -> Result<(), PrecAstroError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(());
        }
        match self.pending.take() {
            None => self.start_record(&tokens),
            Some(record) => self.coefficient_line(record, &tokens),
        }
    }

    fn finish(mut self) -> Result<usize, PrecAstroError> {
        if let Some(record) = self.pending.take() {
            return Err(PrecAstroError::format(format!(
                "data record {} is truncated: found {} of {} coefficients",
                record.number,
                record.coefficients.len(),
                record.ncoeff
            )));
        }
        self.output.flush()?;
        Ok(self.record_count)
    }
}

/// JPL ASCII to binary ephemeris compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemerisCompiler {
    config: CompilerConfig,
}

impl EphemerisCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        EphemerisCompiler { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile to an in-memory buffer.
    ///
    /// Nothing is returned unless the whole input was valid.
    pub fn compile<H: BufRead, D: BufRead>(
        &self,
        header: H,
        data: D,
    ) -> Result<Vec<u8>, PrecAstroError> {
        let mut output = Vec::new();
        self.compile_into(header, data, &mut output)?;
        Ok(output)
    }

    /// Compile, streaming the binary to `output`.
    ///
    /// The header is fully read and validated before anything is written; data records are
    /// then written one by one. On error, `output` holds a partial file and should be
    /// discarded.
    ///
    /// Arguments
    /// ---------
    /// * `header`: the JPL ASCII header (`header.4xx`)
    /// * `data`: the JPL ASCII data file (`ascp*.4xx`)
    /// * `output`: destination of the binary ephemeris
    ///
    /// Return
    /// ------
    /// * A [`CompileSummary`], or the first I/O or format error met
    pub fn compile_into<H: BufRead, D: BufRead, W: Write>(
        &self,
        header: H,
        data: D,
        mut output: W,
    ) -> Result<CompileSummary, PrecAstroError> {
        let header = EphemerisHeader::read(header)?;
        debug!(
            ksize = header.ksize,
            constants = header.const_names.len(),
            denum = header.denum,
            "ephemeris header validated"
        );

        let block_one = header_block(&header, self.config.title_layout)?;
        let block_two = constants_block(&header)?;
        output.write_all(&block_one)?;
        output.write_all(&block_two)?;

        let mut records = RecordWriter::new(output, header.ksize);
        for line in data.lines() {
            records.line(&line?)?;
        }
        let record_count = records.finish()?;

        let summary = CompileSummary {
            ksize: header.ksize,
            record_count,
            denum: header.denum,
            span: header.span,
        };
        info!(
            denum = summary.denum,
            ksize = summary.ksize,
            records = summary.record_count,
            "ephemeris compiled"
        );
        Ok(summary)
    }
}

/// Compile a JPL ASCII ephemeris to the binary format with the default configuration.
pub fn compile<H: BufRead, D: BufRead>(header: H, data: D) -> Result<Vec<u8>, PrecAstroError> {
    EphemerisCompiler::default().compile(header, data)
}

/// [`compile`] with an explicit [`CompilerConfig`].
pub fn compile_with_config<H: BufRead, D: BufRead>(
    header: H,
    data: D,
    config: CompilerConfig,
) -> Result<Vec<u8>, PrecAstroError> {
    EphemerisCompiler::new(config).compile(header, data)
}

/// Streaming [`compile`] with the default configuration.
pub fn compile_into<H: BufRead, D: BufRead, W: Write>(
    header: H,
    data: D,
    output: W,
) -> Result<CompileSummary, PrecAstroError> {
    EphemerisCompiler::default().compile_into(header, data, output)
}

#[cfg(test)]
mod compiler_test {
    use super::*;
    use crate::{
        constants::{IPT_OFFSET, SPAN_OFFSET},
        ephemeris::binary_header::{parse_constant_values, CompiledHeader},
    };
    use std::io::Cursor;

    /// Minimal header with the given KSIZE and NCOEFF = KSIZE / 2
    fn header_text(ksize: usize) -> String {
        format!(
            "KSIZE={ksize:>5}    NCOEFF={:>5}

GROUP   1010

First title
Second title
Third title

GROUP   1030

  2451536.50  2451600.50         32.

GROUP   1040

     3
  DENUM   AU      EMRAT

GROUP   1041

     3
  0.405000000000000000D+03  0.149597870691000000D+09  0.813005600000000044D+02

GROUP   1050

     3    42    81   120   159   198   237   276   315   354   393   432   471
     3     3     3     3     3     3     3     3     3     3     3     3     3
     1     1     1     1     1     1     1     1     1     1     1     1     1

GROUP   1070
",
            ksize / 2
        )
    }

    fn record_text(number: usize, ncoeff: usize, per_line: usize, first: f64) -> String {
        let mut text = format!("{number:>6}{ncoeff:>6}\n");
        let values: Vec<f64> = (0..ncoeff).map(|i| first + i as f64).collect();
        for line in values.chunks(per_line) {
            let mut tokens: Vec<String> =
                line.iter().map(|v| format!("{v:.15E}").replace('E', "D")).collect();
            tokens.resize(per_line, "0.000000000000000D+00".to_string());
            text.push_str("  ");
            text.push_str(&tokens.join("  "));
            text.push('\n');
        }
        text
    }

    fn compile_text(header: &str, data: &str) -> Result<Vec<u8>, PrecAstroError> {
        compile(Cursor::new(header), Cursor::new(data))
    }

    fn f64_at(bytes: &[u8], offset: usize) -> f64 {
        f64::from_ne_bytes(bytes[offset..offset + 8].try_into().unwrap())
    }

    fn i32_at(bytes: &[u8], offset: usize) -> i32 {
        i32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_output_length() {
        let data = format!(
            "{}\n{}",
            record_text(1, 500, 3, 1.0),
            record_text(2, 500, 3, 1000.0)
        );
        let binary = compile_text(&header_text(1000), &data).unwrap();
        assert_eq!(binary.len(), 2 * 1000 * 4 + 2 * 500 * 8);
    }

    #[test]
    fn test_header_block_layout() {
        let binary = compile_text(&header_text(1000), "").unwrap();
        assert_eq!(binary.len(), 2 * 1000 * 4);

        assert_eq!(&binary[..11], b"First title");
        assert!(binary[11..84].iter().all(|&b| b == b' '));
        assert_eq!(&binary[84..96], b"Second title");
        assert_eq!(&binary[168..179], b"Third title");
        assert_eq!(&binary[252..270], b"DENUM AU    EMRAT ");
        assert!(binary[270..SPAN_OFFSET].iter().all(|&b| b == b' '));

        assert_eq!(f64_at(&binary, SPAN_OFFSET), 2451536.5);
        assert_eq!(f64_at(&binary, SPAN_OFFSET + 16), 32.0);
        assert_eq!(i32_at(&binary, 2676), 3);
        assert_eq!(f64_at(&binary, 2680), 149597870.691);
        assert_eq!(i32_at(&binary, IPT_OFFSET), 3);
        assert_eq!(i32_at(&binary, IPT_OFFSET + 4), 3);
        assert_eq!(i32_at(&binary, IPT_OFFSET + 8), 1);
        assert_eq!(i32_at(&binary, IPT_OFFSET + 12), 42);
        assert_eq!(i32_at(&binary, 2840), 405);
        assert_eq!(i32_at(&binary, 2844), 471);
        assert!(binary[HEADER_BLOCK_LEN..4000].iter().all(|&b| b == 0));

        assert_eq!(f64_at(&binary, 4000), 405.0);
        assert_eq!(f64_at(&binary, 4008), 149597870.691);
        assert!(binary[4024..8000].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_header_reads_back() {
        let binary = compile_text(&header_text(1000), "").unwrap();
        let header = CompiledHeader::parse(&binary).unwrap();
        assert_eq!(header.titles[1], "Second title");
        assert_eq!(header.const_names, vec!["DENUM", "AU", "EMRAT"]);
        assert_eq!(header.denum, 405);
        assert_eq!(header.interp[12], [471, 3, 1]);

        let values = parse_constant_values(&binary[4000..], 3).unwrap();
        assert_eq!(values[0], 405.0);
    }

    #[test]
    fn test_duplicate_second_title() {
        let config = CompilerConfig {
            title_layout: TitleLayout::DuplicateSecond,
        };
        let binary = compile_with_config(
            Cursor::new(header_text(1000)),
            Cursor::new(""),
            config,
        )
        .unwrap();
        assert_eq!(&binary[84..96], b"Second title");
        assert_eq!(&binary[168..180], b"Second title");
    }

    #[test]
    fn test_record_values() {
        let data = record_text(1, 500, 3, 2451536.5);
        let binary = compile_text(&header_text(1000), &data).unwrap();
        assert_eq!(f64_at(&binary, 8000), 2451536.5);
        assert_eq!(f64_at(&binary, 8008), 2451537.5);
        assert_eq!(f64_at(&binary, 8000 + 499 * 8), 2451536.5 + 499.0);
    }

    #[test]
    fn test_padding_discarded() {
        // 500 = 166 * 3 + 2: the last line carries one padding zero
        let data = record_text(1, 500, 3, 1.0);
        assert_eq!(data.lines().count(), 168);
        let binary = compile_text(&header_text(1000), &data).unwrap();
        assert_eq!(binary.len(), 8000 + 500 * 8);
    }

    #[test]
    fn test_mismatched_files() {
        let data = record_text(1, 400, 3, 1.0);
        assert_eq!(
            compile_text(&header_text(1000), &data),
            Err(PrecAstroError::EphemerisFormatError(
                "number of data coefficients doesn't match header: mismatched files?".into()
            ))
        );
    }

    #[test]
    fn test_huge_coefficient_count() {
        for count in ["9223372036854775809", "18446744073709551615"] {
            let data = format!("     1 {count}\n  1.0D+00\n");
            assert_eq!(
                compile_text(&header_text(1000), &data),
                Err(PrecAstroError::EphemerisFormatError(
                    "number of data coefficients doesn't match header: mismatched files?".into()
                ))
            );
        }
    }

    #[test]
    fn test_truncated_record() {
        let data = record_text(7, 500, 3, 1.0);
        let truncated: String = data.lines().take(100).map(|l| format!("{l}\n")).collect();
        assert_eq!(
            compile_text(&header_text(1000), &truncated),
            Err(PrecAstroError::EphemerisFormatError(
                "data record 7 is truncated: found 297 of 500 coefficients".into()
            ))
        );
    }

    #[test]
    fn test_blank_lines_ignored() {
        let data = record_text(1, 500, 3, 1.0).replace('\n', "\n\n");
        let binary = compile_text(&header_text(1000), &data).unwrap();
        assert_eq!(binary.len(), 8000 + 500 * 8);
    }

    #[test]
    fn test_ksize_too_small() {
        assert_eq!(
            compile_text(&header_text(700), ""),
            Err(PrecAstroError::EphemerisFormatError(
                "KSIZE too small: the header block needs 2856 bytes, records are 2800 bytes"
                    .into()
            ))
        );
        assert_eq!(
            compile_text(&header_text(750), ""),
            Err(PrecAstroError::EphemerisFormatError(
                "KSIZE too small: the constants block needs 3200 bytes, records are 3000 bytes"
                    .into()
            ))
        );
    }

    #[test]
    fn test_streaming_summary() {
        let data = format!(
            "{}{}{}",
            record_text(1, 500, 3, 1.0),
            record_text(2, 500, 3, 1.0),
            record_text(3, 500, 3, 1.0)
        );
        let mut output = Vec::new();
        let summary =
            compile_into(Cursor::new(header_text(1000)), Cursor::new(data), &mut output).unwrap();
        assert_eq!(
            summary,
            CompileSummary {
                ksize: 1000,
                record_count: 3,
                denum: 405,
                span: [2451536.5, 2451600.5, 32.0],
            }
        );
        assert_eq!(output.len(), 8000 + 3 * 4000);
    }

    #[test]
    fn test_invalid_coefficient() {
        let data = record_text(1, 500, 3, 1.0).replacen("1.000000000000000D0", "1.0X", 1);
        assert_eq!(
            compile_text(&header_text(1000), &data),
            Err(PrecAstroError::EphemerisFormatError(
                "invalid coefficient \"1.0X\" in data record 1".into()
            ))
        );
    }
}
