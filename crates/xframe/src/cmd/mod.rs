use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod identity;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a wire envelope and print its contents.
    Decode(DecodeArgs),
    /// Print the identity payload a vendor frame is named with.
    Identity(IdentityArgs),
    /// Replay a scenario against in-memory vendor frames.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Identity(args) => identity::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Raw message, marker included. Use `-` to read it from stdin.
    pub message: String,
}

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// Sentinel assigned to the frame.
    #[arg(long)]
    pub sentinel: String,
    /// Bootstrap script the frame loads.
    #[arg(long, value_name = "URL")]
    pub script_src: Option<String>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario file (JSON).
    pub path: PathBuf,
    /// Fail on vendor misconfiguration instead of reporting it.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show platform and wire protocol details.
    #[arg(long)]
    pub extended: bool,
}
