//! Compile a JPL ASCII ephemeris (header + data file) to the binary format.
//!
//! ```text
//! precastro-compile-ephem header.405 ascp1600.405 --output de405.bin
//! ```
//!
//! Only `--output` is all-or-nothing: the file appears once compilation succeeded. On standard
//! output the header blocks and records are streamed, so a failure may leave partial output.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    process::ExitCode,
};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use precastro::{
    ephemeris::compiler::{CompileSummary, CompilerConfig, EphemerisCompiler, TitleLayout},
    precastro_errors::PrecAstroError,
};
use tempfile::NamedTempFile;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "precastro-compile-ephem")]
#[command(about = "Compile a JPL ASCII ephemeris to the binary format")]
#[command(version)]
struct Cli {
    /// ASCII header file (header.4xx)
    header: Utf8PathBuf,

    /// ASCII data file (ascp*.4xx)
    data: Utf8PathBuf,

    /// Write the binary here instead of standard output. The file is only created when
    /// compilation succeeds; standard output may carry partial output on failure
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Repeat the second title in the third title slot, as older converters did
    #[arg(long)]
    legacy_titles: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn config(&self) -> CompilerConfig {
        CompilerConfig {
            title_layout: if self.legacy_titles {
                TitleLayout::DuplicateSecond
            } else {
                TitleLayout::Independent
            },
        }
    }
}

/// Logs go to stderr, stdout may carry the compiled ephemeris.
fn init_logging(level: Level) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("precastro={level}")))
        .map_err(|e| format!("failed to create log filter: {e}"))?;

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn open(path: &Utf8Path) -> Result<BufReader<File>, PrecAstroError> {
    let file = File::open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("{path}: {e}")))?;
    Ok(BufReader::new(file))
}

/// Compile into a temporary file next to `output`, moved into place only on success.
fn compile_to_file(
    compiler: &EphemerisCompiler,
    cli: &Cli,
    output: &Utf8Path,
) -> Result<CompileSummary, PrecAstroError> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut partial = NamedTempFile::new_in(parent)?;

    let mut writer = BufWriter::new(partial.as_file_mut());
    let summary = compiler.compile_into(open(&cli.header)?, open(&cli.data)?, &mut writer)?;
    writer.flush()?;
    drop(writer);

    partial.persist(output).map_err(|e| e.error)?;
    Ok(summary)
}

fn compile_to_stdout(
    compiler: &EphemerisCompiler,
    cli: &Cli,
) -> Result<CompileSummary, PrecAstroError> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let summary = compiler.compile_into(open(&cli.header)?, open(&cli.data)?, &mut writer)?;
    writer.flush()?;
    Ok(summary)
}

fn run(cli: &Cli) -> Result<(), PrecAstroError> {
    let compiler = EphemerisCompiler::new(cli.config());
    let summary = match &cli.output {
        Some(output) => compile_to_file(&compiler, cli, output)?,
        None => compile_to_stdout(&compiler, cli)?,
    };
    info!(
        header = %cli.header,
        data = %cli.data,
        output = cli.output.as_ref().map_or("-", |p| p.as_str()),
        span_start = summary.span[0],
        span_end = summary.span[1],
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = init_logging(cli.log_level()) {
        eprintln!("error: {message}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod compile_ephem_test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_output_help_mentions_partial_stdout() {
        let command = Cli::command();
        let output = command
            .get_arguments()
            .find(|arg| arg.get_id() == "output")
            .unwrap();
        let help = output.get_long_help().or(output.get_help()).unwrap().to_string();
        assert!(help.contains("only created when compilation succeeds"));
        assert!(help.contains("partial output on failure"));
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "precastro-compile-ephem",
            "header.405",
            "ascp1600.405",
            "--legacy-titles",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.header, "header.405");
        assert_eq!(cli.output, None);
        assert_eq!(cli.log_level(), Level::DEBUG);
        assert_eq!(cli.config().title_layout, TitleLayout::DuplicateSecond);
    }
}
