use std::{
    ffi::OsString,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::types::{CheckRequest, CheckResponse};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Debug)]
#[command(
    name = "pr-comment-resource",
    about = "CI resource that emits a version for the latest qualifying comment on each GitHub pull request"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

/// Resource step to run.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read a check request on stdin and print the new versions on stdout
    Check,
}

// Resource images install the binary as `/opt/resource/check`, so the
// program name alone selects the step.
fn transform_program_name(args: Vec<OsString>) -> Vec<OsString> {
    let invoked_as_check = args
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .is_some_and(|name| name == "check");

    if invoked_as_check && args.len() == 1 {
        vec![args[0].clone(), OsString::from("check")]
    } else {
        args
    }
}

/// Parses command-line arguments into the step to run.
pub fn parse_args<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cli = CliArgs::try_parse_from(transform_program_name(args))?;
    Ok(cli.command)
}

/// Decodes a check request, rejecting unknown fields.
pub fn read_check_request<R: Read>(reader: R) -> Result<CheckRequest> {
    serde_json::from_reader(reader).context("Failed to decode check request from stdin")
}

pub fn write_check_response<W: Write>(response: &CheckResponse, writer: &mut W) -> Result<()> {
    serde_json::to_writer(&mut *writer, response)
        .context("Failed to encode check response to stdout")?;
    writeln!(writer)?;
    Ok(())
}
