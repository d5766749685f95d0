use anyhow::{Context, Result};

use cp2k_tools::ConfigTree;
use cp2k_tools::io::inp;

use crate::cli::{FmtArgs, Inp2JsonArgs, IoOptions, Json2InpArgs};
use crate::config::{build_parameters, load_dialect};
use crate::display::Context as DisplayContext;
use crate::io::{describe, open_input, write_output};

use super::ensure_piped_input;

const TOTAL_STEPS: u8 = 2;

pub fn run_inp2json(args: Inp2JsonArgs, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.io.input.as_deref(), "cp2kt inp2json <INPUT>")?;

    let dialect = load_dialect(&args.dialect)?;
    let mut progress = ctx.progress(TOTAL_STEPS);

    progress.step("Reading CP2K input");
    let tree = read_input_tree(&args.io, &dialect)?;
    progress.done(&tree_substeps(&args.io, &tree));

    progress.step("Writing JSON");
    let mut json = if args.compact {
        serde_json::to_string(&tree).context("Failed to serialize JSON")?
    } else {
        inp::to_json_string(&tree).context("Failed to serialize JSON")?
    };
    json.push('\n');
    write_output(args.io.output.as_deref(), json.as_bytes())?;
    progress.done(&[format!(
        "Write JSON → {}",
        describe(args.io.output.as_deref(), "stdout")
    )]);

    progress.finish();
    Ok(())
}

pub fn run_json2inp(args: Json2InpArgs, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.io.input.as_deref(), "cp2kt json2inp <INPUT>")?;

    let params = build_parameters(&args.template)?;
    let mut progress = ctx.progress(TOTAL_STEPS);

    progress.step("Reading JSON tree");
    let input = open_input(args.io.input.as_deref())?;
    let tree = inp::from_json(input).context("Failed to read JSON input tree")?;
    progress.done(&tree_substeps(&args.io, &tree));

    progress.step("Generating CP2K input");
    write_input_tree(&args.io, &tree, &params)?;
    progress.done(&write_substeps(&args.io, params.len()));

    progress.finish();
    Ok(())
}

pub fn run_fmt(args: FmtArgs, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.io.input.as_deref(), "cp2kt fmt <INPUT>")?;

    let dialect = load_dialect(&args.dialect)?;
    let params = build_parameters(&args.template)?;
    let mut progress = ctx.progress(TOTAL_STEPS);

    progress.step("Reading CP2K input");
    let tree = read_input_tree(&args.io, &dialect)?;
    progress.done(&tree_substeps(&args.io, &tree));

    progress.step("Generating CP2K input");
    write_input_tree(&args.io, &tree, &params)?;
    progress.done(&write_substeps(&args.io, params.len()));

    progress.finish();
    Ok(())
}

fn read_input_tree(io: &IoOptions, dialect: &inp::Dialect) -> Result<ConfigTree> {
    let input = open_input(io.input.as_deref())?;
    inp::read(input, dialect).context("Failed to read CP2K input")
}

fn write_input_tree(io: &IoOptions, tree: &ConfigTree, params: &inp::Parameters) -> Result<()> {
    let mut text = inp::generate(tree, params).context("Failed to generate CP2K input")?;
    if !text.is_empty() {
        text.push('\n');
    }
    write_output(io.output.as_deref(), text.as_bytes())
}

fn tree_substeps(io: &IoOptions, tree: &ConfigTree) -> Vec<String> {
    vec![format!(
        "Parse {} ({} top-level sections)",
        describe(io.input.as_deref(), "stdin"),
        tree.len()
    )]
}

fn write_substeps(io: &IoOptions, param_count: usize) -> Vec<String> {
    let mut steps = Vec::new();
    if param_count > 0 {
        steps.push(format!("Substitute {} template parameters", param_count));
    }
    steps.push(format!(
        "Write CP2K input → {}",
        describe(io.output.as_deref(), "stdout")
    ));
    steps
}
