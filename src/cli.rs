//! Command line front end: argument notes, diagnostics and the exit status.
//!
//! Output goes through caller-supplied writers so the binary passes
//! stdout/stderr and tests pass buffers.

use std::io::Write;
use tracing::{error, info};

use crate::error::{ArgsError, SessionError, SessionResult};
use crate::params::{parse_args, SessionParams};
use crate::session::SessionReport;

/// Reason a command line run ended with a failure status
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Read the positional values, printing the defaults note to `out` and every
/// warning to `err` as it is found.
pub fn read_params<S: AsRef<str>>(
    values: &[S],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<SessionParams, ArgsError> {
    let parsed = parse_args(values, |warning| {
        let _ = writeln!(err, "{}", warning);
    })?;

    if parsed.defaulted {
        let p = parsed.params;
        let _ = writeln!(out, "Note: This program accepts (only) four arguments.");
        let _ = writeln!(
            out,
            "First arg: width, Second arg: height, third arg: framerate, fourth arg: camera_id"
        );
        let _ = writeln!(
            out,
            "No arguments given. Assuming default values. width: {}; height: {}; framerate: {}; camera_id: {}",
            p.width, p.height, p.framerate, p.camera_id
        );
    }
    Ok(parsed.params)
}

/// Parse `values`, hand the parameters to `record` and report the outcome.
///
/// Any failure is written to `err` as a one-line diagnostic before it is
/// returned; `record` is not called when the arguments are rejected.
pub fn run<S, R>(
    values: &[S],
    out: &mut dyn Write,
    err: &mut dyn Write,
    record: R,
) -> Result<SessionReport, CliError>
where
    S: AsRef<str>,
    R: FnOnce(&SessionParams) -> SessionResult<SessionReport>,
{
    let result = read_params(values, out, err)
        .map_err(CliError::from)
        .and_then(|params| record(&params).map_err(CliError::from));

    match &result {
        Ok(report) => info!(?report, "Recording finished"),
        Err(e) => {
            if let CliError::Session(SessionError::Open(open)) = e {
                if let Some(reason) = open.reason() {
                    error!(%reason, "Open failed");
                }
            }
            let _ = writeln!(err, "{}", e);
        }
    }
    result
}
