//! The command execution seam.
//!
//! Helpers describe what they want run as a [`CliRequest`] and hand it to a
//! [`CommandExecutor`]. Executors are synchronous: the call blocks until the
//! switch returns the captured output.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::context::{ExecContext, VirtualRouter};
use crate::error::{CliError, CliResult};

/// Format the CLI should render its reply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Plain captured text (also used for `debug cfgmgr` JSON output).
    Text,
    /// XML reply stream with `<reply>` blocks.
    Xml,
}

/// A single command to run on the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliRequest<'a> {
    /// The CLI command string.
    pub command: &'a str,
    /// Requested output format.
    pub format: OutputFormat,
    /// Virtual router to run in.
    pub vr: Option<VirtualRouter>,
}

impl<'a> CliRequest<'a> {
    /// Creates a request for captured text output.
    pub fn text(command: &'a str, ctx: &ExecContext) -> Self {
        Self {
            command,
            format: OutputFormat::Text,
            vr: ctx.vr,
        }
    }

    /// Creates a request for XML output.
    pub fn xml(command: &'a str, ctx: &ExecContext) -> Self {
        Self {
            command,
            format: OutputFormat::Xml,
            vr: ctx.vr,
        }
    }
}

/// Host interface that runs CLI commands and returns their captured output.
pub trait CommandExecutor {
    /// Runs `request` and returns everything the command printed.
    fn execute(&self, request: &CliRequest<'_>) -> CliResult<String>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn execute(&self, request: &CliRequest<'_>) -> CliResult<String> {
        (**self).execute(request)
    }
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for Box<T> {
    fn execute(&self, request: &CliRequest<'_>) -> CliResult<String> {
        (**self).execute(request)
    }
}

/// A request as seen by [`StaticExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// The CLI command string.
    pub command: String,
    /// Requested output format.
    pub format: OutputFormat,
    /// Virtual router the request carried.
    pub vr: Option<VirtualRouter>,
}

/// Executor answering from a table of canned outputs.
///
/// Used for offline parsing and for tests. Every request is recorded so
/// callers can check which commands were issued.
#[derive(Debug, Default)]
pub struct StaticExecutor {
    outputs: HashMap<(String, OutputFormat), String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StaticExecutor {
    /// Creates an executor with no registered outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the text output of `command`.
    pub fn with_text(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs
            .insert((command.into(), OutputFormat::Text), output.into());
        self
    }

    /// Registers the XML output of `command`.
    pub fn with_xml(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs
            .insert((command.into(), OutputFormat::Xml), output.into());
        self
    }

    /// Returns every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the command strings seen so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.command).collect()
    }
}

impl CommandExecutor for StaticExecutor {
    fn execute(&self, request: &CliRequest<'_>) -> CliResult<String> {
        debug!(command = %request.command, format = ?request.format, "Answering from static table");

        let recorded = RecordedRequest {
            command: request.command.to_string(),
            format: request.format,
            vr: request.vr,
        };
        match self.requests.lock() {
            Ok(mut requests) => requests.push(recorded),
            Err(poisoned) => poisoned.into_inner().push(recorded),
        }

        self.outputs
            .get(&(request.command.to_string(), request.format))
            .cloned()
            .ok_or_else(|| CliError::UnknownCommand {
                command: request.command.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_context_vr() {
        let ctx = ExecContext::in_vr(VirtualRouter::Mgmt);
        let req = CliRequest::xml("show vlan", &ctx);
        assert_eq!(req.format, OutputFormat::Xml);
        assert_eq!(req.vr, Some(VirtualRouter::Mgmt));

        let req = CliRequest::text("show vlan", &ExecContext::default());
        assert_eq!(req.format, OutputFormat::Text);
        assert_eq!(req.vr, None);
    }

    #[test]
    fn test_static_executor_answers_by_format() {
        let exec = StaticExecutor::new()
            .with_text("show vlan", "text reply")
            .with_xml("show vlan", "<reply/>");
        let ctx = ExecContext::default();

        assert_eq!(
            exec.execute(&CliRequest::text("show vlan", &ctx)).unwrap(),
            "text reply"
        );
        assert_eq!(
            exec.execute(&CliRequest::xml("show vlan", &ctx)).unwrap(),
            "<reply/>"
        );
    }

    #[test]
    fn test_static_executor_unknown_command() {
        let exec = StaticExecutor::new();
        let result = exec.execute(&CliRequest::text("show ports", &ExecContext::default()));
        match result {
            Err(CliError::UnknownCommand { command }) => assert_eq!(command, "show ports"),
            other => panic!("Expected UnknownCommand error, got {:?}", other),
        }
    }

    #[test]
    fn test_static_executor_records_requests() {
        let exec = StaticExecutor::new().with_text("show switch", "ok");
        let ctx = ExecContext::in_vr(VirtualRouter::User(4));

        let _ = exec.execute(&CliRequest::text("show switch", &ctx));
        let _ = exec.execute(&CliRequest::xml("show fans", &ctx));

        let requests = exec.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].command, "show switch");
        assert_eq!(requests[1].format, OutputFormat::Xml);
        assert!(requests.iter().all(|r| r.vr == Some(VirtualRouter::User(4))));
        assert_eq!(exec.commands(), vec!["show switch", "show fans"]);
    }

    #[test]
    fn test_executor_through_reference_and_box() {
        let exec = StaticExecutor::new().with_text("show version", "16.1");
        let by_ref: &dyn CommandExecutor = &exec;
        let ctx = ExecContext::default();
        assert_eq!(
            by_ref.execute(&CliRequest::text("show version", &ctx)).unwrap(),
            "16.1"
        );

        let boxed: Box<dyn CommandExecutor> = Box::new(StaticExecutor::new().with_text("a", "b"));
        assert_eq!(boxed.execute(&CliRequest::text("a", &ctx)).unwrap(), "b");
    }
}
