//! Shell-backed command execution.
//!
//! [`ShellExecutor`] runs the switch CLI program through `/bin/sh -c`,
//! quoting the command so that arbitrary port lists and VLAN names cannot
//! break out of the argument.
//!
//! # Example
//!
//! ```ignore
//! use exos_cli_common::{CliRequest, CommandExecutor, ExecContext, ShellExecutor};
//!
//! let exec = ShellExecutor::new("exsh").with_xml_flag("--xml");
//! let out = exec.execute(&CliRequest::xml("show vlan", &ExecContext::default()))?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::{Command, Stdio};

use crate::context::NS_ID_PATH;
use crate::error::{CliError, CliResult};
use crate::exec::{CliRequest, CommandExecutor, OutputFormat};

/// Path to the shell used to run CLI commands.
pub const SH_CMD: &str = "/bin/sh";

/// Default CLI program on the switch.
pub const DEFAULT_CLI_PROGRAM: &str = "exsh";

/// Default flag asking the CLI for XML output.
pub const DEFAULT_XML_FLAG: &str = "--xml";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes `$`, `` ` ``, `"`, `\`
/// and newline.
///
/// # Example
///
/// ```
/// use exos_cli_common::shell::shellquote;
///
/// assert_eq!(shellquote("show vlan"), "\"show vlan\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Executor that shells out to the switch CLI program.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    /// CLI program (path or name on `$PATH`).
    program: String,
    /// Flag passed before the command for XML output.
    xml_flag: String,
    /// Shell used to run the composed command line.
    shell: String,
    /// Namespace file the shell writes before `exec`ing the CLI.
    ns_id_path: String,
}

impl ShellExecutor {
    /// Creates an executor running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            xml_flag: DEFAULT_XML_FLAG.to_string(),
            shell: SH_CMD.to_string(),
            ns_id_path: NS_ID_PATH.to_string(),
        }
    }

    /// Overrides the flag used to request XML output.
    pub fn with_xml_flag(mut self, flag: impl Into<String>) -> Self {
        self.xml_flag = flag.into();
        self
    }

    /// Overrides the shell used to run the command line.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Overrides the namespace file written when a virtual router is set.
    pub fn with_ns_id_path(mut self, path: impl Into<String>) -> Self {
        self.ns_id_path = path.into();
        self
    }

    /// Builds the shell script for a request.
    ///
    /// With a virtual router set, the spawned shell moves itself into the
    /// VR namespace and then `exec`s the CLI, so only the child is affected.
    /// The id is written with the `printf` builtin: an external command
    /// would redirect in its own process and `/proc/self` would name it.
    pub fn build_script(&self, request: &CliRequest<'_>) -> String {
        let invocation = match request.format {
            OutputFormat::Text => format!("{} {}", self.program, shellquote(request.command)),
            OutputFormat::Xml => format!(
                "{} {} {}",
                self.program,
                self.xml_flag,
                shellquote(request.command)
            ),
        };

        match request.vr {
            Some(vr) => format!(
                "printf '%s\\n' {} > {} && exec {}",
                vr.id(),
                self.ns_id_path,
                invocation
            ),
            None => invocation,
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CLI_PROGRAM)
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, request: &CliRequest<'_>) -> CliResult<String> {
        let script = self.build_script(request);
        tracing::debug!(command = %request.command, script = %script, "Executing CLI command");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| CliError::ShellExec {
                command: request.command.to_string(),
                source: e,
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if exit_code == 0 {
            tracing::trace!(command = %request.command, bytes = stdout.len(), "Command succeeded");
            Ok(stdout)
        } else {
            tracing::warn!(
                command = %request.command,
                exit_code = exit_code,
                stderr = %stderr,
                "Command failed"
            );
            let output = if stderr.is_empty() {
                stdout.trim().to_string()
            } else {
                stderr
            };
            Err(CliError::CommandFailed {
                command: request.command.to_string(),
                exit_code,
                output,
            })
        }
    }
}
