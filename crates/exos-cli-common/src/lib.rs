//! Common infrastructure for scripts that drive an EXOS switch CLI.
//!
//! This crate provides the seam between script-level helpers and the
//! host command interface:
//!
//! - [`exec`]: The [`CommandExecutor`] trait and request types
//! - [`shell`]: Shell-backed executor with proper quoting
//! - [`context`]: Virtual router execution context
//! - [`error`]: Error types for CLI operations
//!
//! # Architecture
//!
//! Helpers never talk to the switch directly. Every query is expressed as a
//! [`CliRequest`] (command string, output format, virtual router) and handed
//! to an executor, which returns the captured output as text:
//!
//! 1. Build the command string
//! 2. Attach the caller's [`ExecContext`]
//! 3. Execute through a [`CommandExecutor`]
//! 4. Parse and reshape the captured output
//!
//! # Example
//!
//! ```ignore
//! use exos_cli_common::{CliRequest, CommandExecutor, ExecContext, ShellExecutor};
//!
//! let exec = ShellExecutor::new("exsh");
//! let ctx = ExecContext::default();
//! let config = exec.execute(&CliRequest::text("show config", &ctx))?;
//! ```

pub mod context;
pub mod error;
pub mod exec;
pub mod shell;

// Re-export commonly used items at crate root
pub use context::{enter_namespace, enter_namespace_at, ExecContext, VirtualRouter, NS_ID_PATH};
pub use error::{CliError, CliResult};
pub use exec::{CliRequest, CommandExecutor, OutputFormat, StaticExecutor};
pub use shell::{shellquote, ShellExecutor};
