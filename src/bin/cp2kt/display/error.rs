use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap_lines;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap_lines(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap_lines(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap_lines(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_io_hints(err);
        collector.collect_log_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use cp2k_tools::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Syntax(syntax) => self.collect_syntax_hints(syntax),

            IoError::Format(format) => self.collect_format_hints(format),

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} data",
                    line, format
                ));
                self.add("Inspect the file around that line for malformed entries");
            }

            IoError::CountMismatch { frame, .. } => {
                self.add(format!(
                    "The atom count line of frame {} does not match its atom lines",
                    frame
                ));
                self.add("The trajectory may be truncated or frames may be concatenated badly");
            }

            IoError::StepComment { .. } => {
                self.add("Restart cleaning needs CP2K MD trajectory comments");
                self.add("Expected comments like 'i = 10, time = 5.000, E = -17.15'");
            }

            IoError::Json(source) => {
                self.add(format!(
                    "JSON error near line {}, column {}",
                    source.line(),
                    source.column()
                ));
                self.add("Sections must be objects, flags null and repeated keywords arrays");
            }

            IoError::Dialect(_) => {
                self.add("The dialect file has invalid TOML or unknown keys");
                self.add("Recognized keys: 'end_mismatch' (\"strict\" or \"warn\") and a [positional] table");
            }
        }
    }

    fn collect_syntax_hints(&mut self, err: &cp2k_tools::io::SyntaxError) {
        use cp2k_tools::io::SyntaxError;

        match err {
            SyntaxError::Unexpected { line, column, .. } => {
                self.add(format!("Check line {} near column {}", line, column));
                self.add("Every keyword must be inside a '&SECTION' ... '&END' block");
            }

            SyntaxError::MismatchedEnd { expected, .. } => {
                self.add(format!(
                    "Close the section at line {} with '&END {}'",
                    err.line(),
                    expected.to_uppercase()
                ));
                self.add("Use a dialect with end_mismatch = \"warn\" to accept such files");
            }

            SyntaxError::Unclosed { name, .. } => {
                self.add(format!("Add the missing '&END {}'", name.to_uppercase()));
            }

            SyntaxError::StrayEnd { .. } => {
                self.add("Remove the extra '&END' or add the matching section start");
            }
        }
    }

    fn collect_format_hints(&mut self, err: &cp2k_tools::io::FormatError) {
        use cp2k_tools::io::FormatError;

        match err {
            FormatError::Shape { .. } => {
                self.add("A key cannot hold both keyword lines and sections");
                self.add("Arrays must not be empty; nested arrays hold only scalars");
            }

            FormatError::MissingParameter(name) => {
                self.add(format!("Pass a value with -p {}=VALUE", name));
                self.add("Or list it in a --params TOML file");
            }

            FormatError::Template { .. } => {
                self.add("Placeholders look like {NAME}, without '.', '[', ':' or '!'");
                self.add("Write literal braces as '{{' and '}}'");
            }
        }
    }

    fn collect_log_hints(&mut self, err: &Error) {
        use cp2k_tools::log::Error as LogError;

        let Some(log_err) = err.downcast_ref::<LogError>() else {
            return;
        };

        self.mark_typed();

        match log_err {
            LogError::Io { source } => self.collect_std_io_hints(source),
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid data (not UTF-8 text?)");
                self.add("Verify the file is not truncated or corrupted");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            ErrorKind::BrokenPipe => {
                self.add("Output consumer terminated early");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("terminal") || msg.contains("stdin") {
            self.add("Input appears to be from a terminal");
            self.add("Provide an input file or pipe data to stdin");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
            return;
        }

        if msg.contains("toml") || msg.contains("parameter") {
            self.add("Parameter files hold a flat TOML table, e.g. project = \"water\"");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
