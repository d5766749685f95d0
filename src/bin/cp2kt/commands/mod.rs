mod input;
mod log;
mod xyz;

use input::{run_fmt, run_inp2json, run_json2inp};
use log::{run_oq, run_refs};
use xyz::{run_clean_restarts, run_last};

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::{Command, XyzCommand};
use crate::display::Context;
use crate::io::{is_std_stream, stdin_is_tty};

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Inp2json(args) => run_inp2json(args, ctx),
        Command::Json2inp(args) => run_json2inp(args, ctx),
        Command::Fmt(args) => run_fmt(args, ctx),
        Command::Oq(args) => run_oq(args, ctx),
        Command::Refs(args) => run_refs(args, ctx),
        Command::Xyz(XyzCommand::Last(io)) => run_last(io, ctx),
        Command::Xyz(XyzCommand::CleanRestarts(io)) => run_clean_restarts(io, ctx),
    }
}

fn ensure_piped_input(input: Option<&Path>, usage: &str) -> Result<()> {
    if is_std_stream(input) && stdin_is_tty() {
        bail!("No input file specified and stdin is a terminal.\n\nUsage: {usage} or pipe data via stdin.");
    }
    Ok(())
}
