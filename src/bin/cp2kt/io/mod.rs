use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Read, Stdin, StdoutLock, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Returns `true` if stdin is a terminal (interactive).
pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

/// `None` and `-` both mean the standard stream.
pub fn is_std_stream(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}

pub enum InputSource {
    File(BufReader<File>),
    Stdin(BufReader<Stdin>),
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::File(r) => r.read(buf),
            InputSource::Stdin(r) => r.read(buf),
        }
    }
}

impl BufRead for InputSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            InputSource::File(r) => r.fill_buf(),
            InputSource::Stdin(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            InputSource::File(r) => r.consume(amt),
            InputSource::Stdin(r) => r.consume(amt),
        }
    }
}

pub fn open_input(path: Option<&Path>) -> Result<InputSource> {
    match path {
        Some(p) if !is_std_stream(Some(p)) => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open input file: {}", p.display()))?;
            Ok(InputSource::File(BufReader::new(file)))
        }
        _ => Ok(InputSource::Stdin(BufReader::new(io::stdin()))),
    }
}

enum OutputTarget {
    File(BufWriter<File>),
    Stdout(BufWriter<StdoutLock<'static>>),
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::File(w) => w.write(buf),
            OutputTarget::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::File(w) => w.flush(),
            OutputTarget::Stdout(w) => w.flush(),
        }
    }
}

fn create_output(path: Option<&Path>) -> Result<OutputTarget> {
    match path {
        Some(p) if !is_std_stream(Some(p)) => {
            let file = File::create(p)
                .with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Ok(OutputTarget::File(BufWriter::new(file)))
        }
        _ => Ok(OutputTarget::Stdout(BufWriter::new(io::stdout().lock()))),
    }
}

/// Writes fully rendered `contents` to a file or stdout.
///
/// The file is created (or truncated) only here, after rendering succeeded.
pub fn write_output(path: Option<&Path>, contents: &[u8]) -> Result<()> {
    let mut output = create_output(path)?;
    output
        .write_all(contents)
        .and_then(|()| output.flush())
        .with_context(|| format!("Failed to write {}", describe(path, "stdout")))
}

/// Display name of an input or output for progress messages.
pub fn describe(path: Option<&Path>, stream: &str) -> String {
    match path {
        Some(p) if !is_std_stream(Some(p)) => p
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| p.display().to_string()),
        _ => stream.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dash_means_standard_stream() {
        assert!(is_std_stream(None));
        assert!(is_std_stream(Some(Path::new("-"))));
        assert!(!is_std_stream(Some(Path::new("run.inp"))));
    }

    #[test]
    fn write_output_replaces_file_contents() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("out.inp");
        std::fs::write(&path, "old contents that are longer").unwrap();

        write_output(Some(&path), b"&GLOBAL\n&END GLOBAL\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "&GLOBAL\n&END GLOBAL\n");
    }

    #[test]
    fn describe_uses_file_name() {
        let path = PathBuf::from("/tmp/runs/water.inp");
        assert_eq!(describe(Some(&path), "stdin"), "water.inp");
        assert_eq!(describe(None, "stdout"), "stdout");
        assert_eq!(describe(Some(Path::new("-")), "stdin"), "stdin");
    }
}
