//! exosq - query an EXOS switch from the shell
//!
//! Runs one exoslib query and prints the result as JSON on stdout.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use exos_cli_common::shell::{DEFAULT_CLI_PROGRAM, DEFAULT_XML_FLAG};
use exoslib::{
    configured_segments_with, yes_no, CliError, ShellExecutor, Switch, TrailingModule,
    VirtualRouter,
};

/// Exit status when the switch could not run a command.
const EXIT_COMMAND_FAILED: u8 = 2;

/// Query an EXOS switch through its CLI
#[derive(Parser, Debug)]
#[command(name = "exosq")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CLI program used to run switch commands
    #[arg(long, env = "EXOSQ_CLI_PROGRAM", default_value = DEFAULT_CLI_PROGRAM)]
    cli_program: String,

    /// Flag asking the CLI program for XML output
    #[arg(long, env = "EXOSQ_XML_FLAG", default_value = DEFAULT_XML_FLAG)]
    xml_flag: String,

    /// Virtual router to run commands in (mgmt, default or a namespace number)
    #[arg(long)]
    vr: Option<VirtualRouter>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List modules with non-default configuration
    CfgAreas {
        /// Read the configuration dump from a file ("-" for stdin) instead of the switch
        #[arg(long)]
        file: Option<PathBuf>,

        /// Also report a module still open at the end of the dump
        #[arg(long)]
        emit_trailing: bool,

        /// Print each module's configuration text too
        #[arg(long)]
        with_text: bool,
    },
    /// Run a command with XML output and print the flattened records
    Data {
        /// CLI command to run
        command: String,
    },
    /// List ports whose link is up
    ActivePorts,
    /// Print a port list covering every port
    AllPorts,
    /// List the VLANs a port belongs to
    PortVlans {
        /// Port number
        port: String,
    },
    /// List all VLANs
    Vlans,
    /// Print the untagged and tagged ports of a VLAN
    VlanPorts {
        /// VLAN name
        vlan: String,
    },
    /// Print IP statistics for every VLAN
    IpStats,
    /// Print CPU and fabric congestion per slot
    Congestion,
    /// Check whether a port's link is up
    PortActive {
        /// Port number
        port: String,
    },
    /// Check whether a port list is valid
    PortValid {
        /// Port list
        port: String,
    },
    /// List operational slots
    Slots,
    /// Print the platform type
    Platform,
    /// Ask a yes/no question on the terminal
    Confirm {
        /// Question to ask
        question: String,

        /// Answer used for an empty reply (y or n)
        #[arg(long, value_parser = parse_yes_no, default_value = "n")]
        default: Option<bool>,
    },
}

fn parse_yes_no(s: &str) -> Result<bool, String> {
    match s {
        "y" | "Y" => Ok(true),
        "n" | "N" => Ok(false),
        _ => Err(format!("expected 'y' or 'n', got '{}'", s)),
    }
}

/// Initializes tracing/logging subsystem
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

fn read_dump(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut dump = String::new();
        io::stdin()
            .read_to_string(&mut dump)
            .context("Failed to read configuration dump from stdin")?;
        Ok(dump)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration dump {}", path.display()))
    }
}

fn run(args: Args) -> Result<()> {
    let executor = ShellExecutor::new(&args.cli_program).with_xml_flag(&args.xml_flag);
    let mut switch = Switch::new(executor);
    switch.set_virtual_router(args.vr);
    debug!(program = %args.cli_program, vr = ?args.vr, "Switch handle ready");

    match args.command {
        Cmd::CfgAreas {
            file,
            emit_trailing,
            with_text,
        } => {
            let trailing = if emit_trailing {
                TrailingModule::Emit
            } else {
                TrailingModule::Drop
            };
            let segments = match file {
                Some(path) => configured_segments_with(&read_dump(&path)?, trailing),
                None => switch
                    .configured_segments(trailing)
                    .context("Failed to read switch configuration")?,
            };
            if with_text {
                print_json(&segments)
            } else {
                let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
                print_json(&names)
            }
        }
        Cmd::Data { command } => print_json(
            &switch
                .show_data(&command)
                .with_context(|| format!("Failed to run '{}'", command))?,
        ),
        Cmd::ActivePorts => print_json(&switch.active_ports()?),
        Cmd::AllPorts => print_json(&switch.all_ports()?),
        Cmd::PortVlans { port } => print_json(&switch.port_vlans(&port)?),
        Cmd::Vlans => print_json(&switch.vlans()?),
        Cmd::VlanPorts { vlan } => print_json(&switch.vlan_ports(&vlan)?),
        Cmd::IpStats => print_json(&switch.ip_stats()?),
        Cmd::Congestion => print_json(&switch.congestion()?),
        Cmd::PortActive { port } => print_json(&switch.is_port_active(&port)?),
        Cmd::PortValid { port } => print_json(&switch.port_is_valid(&port)?),
        Cmd::Slots => print_json(&switch.operational_slots()?),
        Cmd::Platform => print_json(&switch.platform()?),
        Cmd::Confirm { question, default } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stderr();
            let answer = yes_no(&mut input, &mut output, &question, default)?;
            print_json(&answer)
        }
    }
}

/// Picks the exit status and message prefix for a failed run.
fn failure(err: &anyhow::Error) -> (u8, &'static str) {
    let command_failed = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<CliError>())
        .any(CliError::is_command_failure);
    if command_failed {
        (EXIT_COMMAND_FAILED, "switch command failed")
    } else {
        (1, "error")
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (code, prefix) = failure(&e);
            eprintln!("exosq: {}: {:#}", prefix, e);
            ExitCode::from(code)
        }
    }
}
