//! exoslib - helpers for scripts driving an EXOS switch CLI
//!
//! Issues switch CLI commands through a [`CommandExecutor`], parses the
//! textual, XML and JSON output, and returns structured data: configured
//! modules, port lists, VLAN membership, congestion statistics and platform
//! identification.

mod cfgmgr;
mod commands;
mod config_areas;
mod platform;
mod prompt;
mod reply;
mod switch;
mod types;

pub use cfgmgr::*;
pub use commands::*;
pub use config_areas::*;
pub use platform::*;
pub use prompt::*;
pub use reply::*;
pub use switch::Switch;
pub use types::*;

pub use exos_cli_common::{
    CliError, CliRequest, CliResult, CommandExecutor, ExecContext, OutputFormat, ShellExecutor,
    StaticExecutor, VirtualRouter,
};
