use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "cp2kt",
    about = "Convert and inspect CP2K input, coordinate and output files",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalOptions {
    /// Suppress progress output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level for diagnostics on stderr (overrides CP2KT_LOG)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a CP2K input file to its JSON tree
    Inp2json(Inp2JsonArgs),

    /// Generate a CP2K input file from a JSON tree
    Json2inp(Json2InpArgs),

    /// Rewrite a CP2K input file in canonical order
    Fmt(FmtArgs),

    /// Query values from a CP2K output log
    Oq(OqArgs),

    /// Extract the references table from a CP2K output log
    Refs(RefsArgs),

    /// Work with multi-frame XYZ coordinate files
    #[command(subcommand)]
    Xyz(XyzCommand),
}

#[derive(Subcommand)]
pub enum XyzCommand {
    /// Write only the last frame
    Last(IoOptions),

    /// Drop frames of an MD trajectory that were recomputed after restarts
    CleanRestarts(IoOptions),
}

/// Input/output options shared by the conversion commands.
#[derive(Args)]
pub struct IoOptions {
    /// Input file (stdin if omitted or '-')
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file (stdout if omitted or '-')
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
#[command(next_help_heading = "Input Dialect")]
pub struct DialectOptions {
    /// Parser dialect (TOML file with `positional` and `end_mismatch`)
    #[arg(long, value_name = "FILE")]
    pub dialect: Option<PathBuf>,
}

#[derive(Args)]
#[command(next_help_heading = "Template Parameters")]
pub struct TemplateOptions {
    /// Value for a `{KEY}` placeholder, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// TOML table of placeholder values (overridden by --param)
    #[arg(long = "params", value_name = "FILE")]
    pub params_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct Inp2JsonArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub dialect: DialectOptions,

    /// Write the JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args)]
pub struct Json2InpArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub template: TemplateOptions,
}

#[derive(Args)]
pub struct FmtArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub dialect: DialectOptions,

    #[command(flatten)]
    pub template: TemplateOptions,
}

#[derive(Args)]
pub struct OqArgs {
    /// Query path, e.g. '.', '.GLOBAL.Run type' or '.PROGRAM[0]'
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// CP2K output file to read
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub file: PathBuf,

    /// Print compact JSON instead of indented JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RefsArgs {
    #[command(flatten)]
    pub io: IoOptions,

    /// Print compact JSON instead of indented JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn parse() -> Cli {
    Cli::parse()
}
