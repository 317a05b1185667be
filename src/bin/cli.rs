use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use timestamp_json::TimestampedJson;

pub(crate) const PROGRAM_NAME: &str = "json-timestamps";

/// Failures surfaced to the user. Each maps to a non-zero exit status.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct ParsedArgs {
    show_help: bool,
    show_version: bool,
    stream: bool,
}

fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Re-encode JSON from stdin, optionally printing call-timing lines.")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timestamps")
                .long("timestamps")
                .help("Print elapsed and delta timings around each JSON call.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stream")
                .long("stream")
                .help("Accept a sequence of documents and write them through a stream encoder.")
                .action(ArgAction::SetTrue),
        )
}

fn parse_args<I>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let matches = clap_command().try_get_matches_from(args)?;
    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        stream: matches.get_flag("stream"),
    })
}

/// Runs the filter with explicit I/O handles.
///
/// `--timestamps` is accepted here so it is not rejected as unknown; the
/// process-wide recorder reads it from the process arguments itself, and its
/// lines go to the real standard output.
pub(crate) fn run_with<I, In, Out, Diag>(
    args: I,
    input: In,
    stdout: &mut Out,
    stderr: &mut Diag,
) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString>,
    In: Read,
    Out: Write,
    Diag: Write,
{
    match run(args, input, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(%error, "exiting with failure");
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run<I, In, Out>(args: I, input: In, stdout: &mut Out) -> Result<(), CliError>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
    In: Read,
    Out: Write,
{
    let parsed = parse_args(args)?;

    if parsed.show_help {
        let help = clap_command().render_help();
        write!(stdout, "{help}").map_err(CliError::Write)?;
        return Ok(());
    }
    if parsed.show_version {
        writeln!(stdout, "{PROGRAM_NAME} {}", env!("CARGO_PKG_VERSION")).map_err(CliError::Write)?;
        return Ok(());
    }

    let json = TimestampedJson::global();
    let count = if parsed.stream {
        normalise_stream(&json, input, stdout)?
    } else {
        normalise_document(&json, input, stdout)?;
        1
    };
    tracing::debug!(count, "documents written");
    stdout.flush().map_err(CliError::Write)
}

/// Reads one document, decodes it with `from_slice` and re-encodes it with
/// `to_vec`.
fn normalise_document<In, Out>(
    json: &TimestampedJson<'_>,
    mut input: In,
    stdout: &mut Out,
) -> Result<(), CliError>
where
    In: Read,
    Out: Write,
{
    let span = tracing::info_span!("normalise");
    let _entered = span.enter();

    let mut buffer = Vec::new();
    input.read_to_end(&mut buffer).map_err(CliError::Read)?;

    let document: Value = json.from_slice(&buffer)?;
    let encoded = json.to_vec(&document)?;
    stdout.write_all(&encoded).map_err(CliError::Write)?;
    stdout.write_all(b"\n").map_err(CliError::Write)
}

/// Decodes whitespace-separated documents and writes each through a stream
/// encoder, one per line.
fn normalise_stream<In, Out>(
    json: &TimestampedJson<'_>,
    input: In,
    stdout: &mut Out,
) -> Result<usize, CliError>
where
    In: Read,
    Out: Write,
{
    let mut count = 0;
    for document in json.stream_decoder(input).into_iter::<Value>() {
        let document = document.map_err(|error| {
            if error.is_io() {
                CliError::Read(error.into())
            } else {
                CliError::Json(error)
            }
        })?;

        let span = tracing::info_span!("document", index = count);
        let _entered = span.enter();
        document
            .serialize(&mut json.stream_encoder(&mut *stdout))
            .map_err(|error| {
                if error.is_io() {
                    CliError::Write(error.into())
                } else {
                    CliError::Json(error)
                }
            })?;
        stdout.write_all(b"\n").map_err(CliError::Write)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_capture(args: &[&str], input: &str) -> (Result<(), CliError>, String) {
        let mut stdout = Vec::new();
        let result = run(args.iter().copied(), input.as_bytes(), &mut stdout);
        (result, String::from_utf8(stdout).expect("stdout is UTF-8"))
    }

    fn stderr_of(args: &[&str], input: &str) -> String {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let _ = run_with(args.iter().copied(), input.as_bytes(), &mut stdout, &mut stderr);
        String::from_utf8(stderr).expect("stderr is UTF-8")
    }

    #[test]
    fn single_document_is_compacted() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME], "{ \"b\" : [1, 2],\n  \"a\": null }\n");
        assert!(result.is_ok());
        assert_eq!(stdout, "{\"a\":null,\"b\":[1,2]}\n");
    }

    #[test]
    fn integer_document_round_trips() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME], "42");
        assert!(result.is_ok());
        assert_eq!(stdout, "42\n");
    }

    #[test]
    fn stream_mode_writes_one_line_per_document() {
        let (result, stdout) =
            run_capture(&[PROGRAM_NAME, "--stream"], "1 \"two\"\n{\"three\": 3}");
        assert!(result.is_ok());
        assert_eq!(stdout, "1\n\"two\"\n{\"three\":3}\n");
    }

    #[test]
    fn empty_stream_writes_nothing() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--stream"], "  \n");
        assert!(result.is_ok());
        assert!(stdout.is_empty());
    }

    #[test]
    fn malformed_stream_stops_at_bad_document() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--stream"], "1 [2");
        assert!(matches!(result, Err(CliError::Json(_))));
        assert_eq!(stdout, "1\n");
    }

    #[test]
    fn malformed_input_is_a_json_error() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME], "{\"a\":");
        assert!(matches!(result, Err(CliError::Json(ref error)) if error.is_eof()));
        assert!(stdout.is_empty());
    }

    #[test]
    fn empty_input_is_malformed() {
        let (result, _) = run_capture(&[PROGRAM_NAME], "");
        assert!(matches!(result, Err(CliError::Json(_))));
    }

    #[test]
    fn failures_are_reported_on_stderr() {
        let stderr = stderr_of(&[PROGRAM_NAME], "nope");
        assert!(stderr.starts_with("json-timestamps: invalid JSON input:"));
        assert!(stderr.ends_with('\n'));
        assert!(stderr_of(&[PROGRAM_NAME], "true").is_empty());
    }

    #[test]
    fn timestamps_flag_is_accepted() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--timestamps"], "[]");
        assert!(result.is_ok());
        assert!(stdout.ends_with("[]\n"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--bogus"], "1");
        assert!(matches!(result, Err(CliError::Usage(_))));
        assert!(stdout.is_empty());
        assert!(stderr_of(&[PROGRAM_NAME, "--bogus"], "1").contains("--bogus"));
    }

    #[test]
    fn help_lists_flags() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--help"], "");
        assert!(result.is_ok());
        assert!(stdout.contains("--timestamps"));
        assert!(stdout.contains("--stream"));
    }

    #[test]
    fn version_reports_package_version() {
        let (result, stdout) = run_capture(&[PROGRAM_NAME, "--version"], "");
        assert!(result.is_ok());
        assert_eq!(stdout, format!("json-timestamps {}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn missing_program_name_is_tolerated() {
        let mut stdout = Vec::new();
        let result = run(Vec::<OsString>::new(), &b"true"[..], &mut stdout);
        assert!(result.is_ok());
        assert_eq!(stdout, b"true\n");
    }
}
