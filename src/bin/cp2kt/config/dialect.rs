use std::fs;

use anyhow::{Context, Result};

use cp2k_tools::io::inp::Dialect;

use crate::cli::DialectOptions;

pub fn load_dialect(opts: &DialectOptions) -> Result<Dialect> {
    let Some(path) = &opts.dialect else {
        return Ok(Dialect::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dialect file: {}", path.display()))?;
    Dialect::from_toml_str(&text)
        .with_context(|| format!("Failed to load dialect from {}", path.display()))
}
