use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use cp2k_tools::log::{self, OutputParser};

use crate::cli::{OqArgs, RefsArgs};
use crate::display::Context as DisplayContext;
use crate::io::{describe, open_input, write_output};

use super::ensure_piped_input;

pub fn run_oq(args: OqArgs, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(Some(args.file.as_path()), "cp2kt oq <QUERY> -f <FILE>")?;

    let mut progress = ctx.progress(1);

    progress.step("Scanning CP2K output");
    let input = open_input(Some(args.file.as_path()))?;
    let mut parser = OutputParser::new();
    parser.parse(input).context("Failed to scan CP2K output")?;
    progress.done(&[format!("Parse {}", describe(Some(args.file.as_path()), "stdin"))]);
    progress.finish();

    print_json(None, &parser.query(&args.query), args.json)
}

pub fn run_refs(args: RefsArgs, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.io.input.as_deref(), "cp2kt refs <INPUT>")?;

    let mut progress = ctx.progress(1);

    progress.step("Extracting references");
    let mut text = String::new();
    open_input(args.io.input.as_deref())?
        .read_to_string(&mut text)
        .map_err(log::Error::from)
        .context("Failed to read CP2K output")?;
    let (references, _) = log::extract_references(&text);
    progress.done(&[format!("Found {} references", references.len())]);
    progress.finish();

    print_json(
        args.io.output.as_deref(),
        &json!({ "references": references }),
        args.json,
    )
}

fn print_json(path: Option<&Path>, value: &Value, compact: bool) -> Result<()> {
    let mut text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to serialize JSON")?;
    text.push('\n');
    write_output(path, text.as_bytes())
}
