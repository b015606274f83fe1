//! Interactive yes/no prompt for operator confirmation.

use std::io::{BufRead, Write};

use tracing::debug;

use exos_cli_common::{CliError, CliResult};

/// Attempts allowed before giving up on an answer.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Message printed after an invalid answer.
pub const INVALID_INPUT_MSG: &str = "ERROR: Invalid input.  Please enter 'y' or 'n'";

/// Asks `request` until a valid answer is given, up to
/// [`DEFAULT_MAX_ATTEMPTS`] times.
pub fn yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    request: &str,
    default: Option<bool>,
) -> CliResult<bool> {
    yes_no_with_attempts(input, output, request, default, DEFAULT_MAX_ATTEMPTS)
}

/// Asks `request` at most `max_attempts` times.
///
/// `y`/`Y` answers yes, `n`/`N` answers no, and an empty line answers
/// `default` when one is given. Anything else prints an error and asks again.
pub fn yes_no_with_attempts<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    request: &str,
    default: Option<bool>,
    max_attempts: usize,
) -> CliResult<bool> {
    for attempt in 1..=max_attempts {
        write!(output, "{}", request)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(CliError::PromptClosed);
        }
        let answer = line.trim_end_matches(['\n', '\r']);

        match (answer, default) {
            ("y" | "Y", _) => return Ok(true),
            ("n" | "N", _) => return Ok(false),
            ("", Some(default)) => return Ok(default),
            _ => {
                debug!(attempt = attempt, answer = %answer, "Invalid prompt answer");
                writeln!(output, "{}", INVALID_INPUT_MSG)?;
            }
        }
    }

    Err(CliError::PromptExhausted {
        attempts: max_attempts,
    })
}
