mod error;
mod progress;

pub use error::print_error;
pub use progress::Progress;

/// Where a command may draw progress while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    /// Progress is drawn only on a terminal stderr and never with `--quiet`.
    pub fn new(quiet: bool) -> Self {
        Self {
            interactive: !quiet && crate::io::stderr_is_tty(),
        }
    }

    pub fn progress(self, total_steps: u8) -> Progress {
        Progress::new(self.interactive, total_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_disables_progress() {
        let ctx = Context::new(true);
        assert!(!ctx.interactive);
        assert!(matches!(ctx.progress(3), Progress::Silent));
    }
}
