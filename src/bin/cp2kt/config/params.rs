use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use cp2k_tools::io::inp::Parameters;

use crate::cli::TemplateOptions;

/// Merges the `--params` file with `-p KEY=VALUE` pairs, the latter winning.
pub fn build_parameters(opts: &TemplateOptions) -> Result<Parameters> {
    let mut params = match &opts.params_file {
        Some(path) => load_parameter_file(path)?,
        None => Parameters::new(),
    };

    for (key, value) in &opts.params {
        params.insert(key.clone(), value.clone());
    }

    Ok(params)
}

fn load_parameter_file(path: &Path) -> Result<Parameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
    parse_parameter_table(&text)
        .with_context(|| format!("Invalid parameter file: {}", path.display()))
}

fn parse_parameter_table(text: &str) -> Result<Parameters> {
    let table: toml::Table = toml::from_str(text).context("Failed to parse TOML")?;

    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => bail!(
                    "parameter '{}' must be a string, number or boolean, not {}",
                    key,
                    other.type_str()
                ),
            };
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn scalar_values_become_strings() {
        let params =
            parse_parameter_table("project = \"water\"\nsteps = 100\ncutoff = 280.5\nprint = true")
                .unwrap();
        assert_eq!(params["project"], "water");
        assert_eq!(params["steps"], "100");
        assert_eq!(params["cutoff"], "280.5");
        assert_eq!(params["print"], "true");
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = parse_parameter_table("[kind]\nelement = \"O\"").unwrap_err();
        assert!(err.to_string().contains("'kind'"));
    }

    #[test]
    fn command_line_pairs_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project = \"water\"\ncutoff = 280").unwrap();

        let params = build_parameters(&TemplateOptions {
            params: vec![("cutoff".into(), "400".into())],
            params_file: Some(file.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(params["project"], "water");
        assert_eq!(params["cutoff"], "400");
    }
}
