use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use cp2k_tools::Frame;
use cp2k_tools::io::xyz;

use crate::cli::IoOptions;
use crate::display::Context as DisplayContext;
use crate::io::{describe, open_input, write_output};

use super::ensure_piped_input;

const TOTAL_STEPS: u8 = 2;

pub fn run_last(args: IoOptions, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.input.as_deref(), "cp2kt xyz last <INPUT>")?;

    let mut progress = ctx.progress(TOTAL_STEPS);

    progress.step("Reading trajectory");
    let input = open_input(args.input.as_deref())?;
    let Some(last) = xyz::read_last(input).context("Failed to read XYZ trajectory")? else {
        bail!("Trajectory contains no frames");
    };
    progress.done(&[format!("Parse {}", describe(args.input.as_deref(), "stdin"))]);

    progress.step("Writing last frame");
    write_frames(&args, std::slice::from_ref(&last))?;
    progress.done(&[format!(
        "Write {} atoms → {}",
        last.atom_count(),
        describe(args.output.as_deref(), "stdout")
    )]);

    progress.finish();
    Ok(())
}

pub fn run_clean_restarts(args: IoOptions, ctx: DisplayContext) -> Result<()> {
    ensure_piped_input(args.input.as_deref(), "cp2kt xyz clean-restarts <INPUT>")?;

    let mut progress = ctx.progress(TOTAL_STEPS);

    progress.step("Reading trajectory");
    let frames = read_frames(&args)?;
    let count = frames.len();
    progress.done(&[format!("Read {} frames", count)]);

    progress.step("Dropping recomputed frames");
    let (kept, report) = xyz::clean_restarts(frames).context("Failed to clean restarts")?;
    write_frames(&args, &kept)?;
    progress.done(&[
        format!("Keep {} of {} frames", kept.len(), count),
        format!("Write XYZ → {}", describe(args.output.as_deref(), "stdout")),
    ]);
    progress.finish();

    let mut stderr = io::stderr().lock();
    for line in report.lines() {
        let _ = writeln!(stderr, "{line}");
    }

    Ok(())
}

fn read_frames(args: &IoOptions) -> Result<Vec<Frame>> {
    let input = open_input(args.input.as_deref())?;
    xyz::read(input).context("Failed to read XYZ trajectory")
}

fn write_frames(args: &IoOptions, frames: &[Frame]) -> Result<()> {
    let mut buffer = Vec::new();
    xyz::write(&mut buffer, frames).context("Failed to write XYZ trajectory")?;
    write_output(args.output.as_deref(), &buffer)
}
