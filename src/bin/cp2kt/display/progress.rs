use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

struct ActiveStep {
    label: String,
    bar: ProgressBar,
    started: Instant,
}

/// Numbered steps on stderr, one spinner at a time.
pub struct StepSpinner {
    started: Instant,
    index: u8,
    total: u8,
    active: Option<ActiveStep>,
}

impl StepSpinner {
    fn new(total: u8) -> Self {
        Self {
            started: Instant::now(),
            index: 0,
            total,
            active: None,
        }
    }

    fn begin(&mut self, label: &str) {
        self.clear();
        self.index += 1;

        let bar = ProgressBar::new_spinner()
            .with_style(spinner_style())
            .with_message(format!("[{}/{}] {label}...", self.index, self.total));
        bar.enable_steady_tick(Duration::from_millis(80));

        self.active = Some(ActiveStep {
            label: label.to_string(),
            bar,
            started: Instant::now(),
        });
    }

    fn done(&mut self, details: &[String]) {
        let Some(step) = self.active.take() else {
            return;
        };
        step.bar.finish_and_clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            step.label,
            step.started.elapsed().as_secs_f64()
        );
        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {detail}");
        }
    }

    fn clear(&mut self) {
        if let Some(step) = self.active.take() {
            step.bar.finish_and_clear();
        }
    }

    fn finish(mut self) {
        self.clear();
        let total = format!("Total: {:.2}s", self.started.elapsed().as_secs_f64());
        let _ = writeln!(io::stderr().lock(), "\n  \x1b[32m✓\x1b[0m Done {total:>45}\n");
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICKS)
}

pub enum Progress {
    Interactive(StepSpinner),
    Silent,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: u8) -> Self {
        if interactive {
            Self::Interactive(StepSpinner::new(total_steps))
        } else {
            Self::Silent
        }
    }

    /// Starts the next step; an unfinished previous step is cleared.
    pub fn step(&mut self, label: &str) {
        if let Self::Interactive(s) = self {
            s.begin(label);
        }
    }

    /// Marks the current step done and lists `details` under it.
    pub fn done(&mut self, details: &[String]) {
        if let Self::Interactive(s) = self {
            s.done(details);
        }
    }

    pub fn finish(self) {
        if let Self::Interactive(s) = self {
            s.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_progress_ignores_steps() {
        let mut progress = Progress::new(false, 2);
        progress.step("Reading");
        progress.done(&["ignored".to_string()]);
        assert!(matches!(progress, Progress::Silent));
        progress.finish();
    }

    #[test]
    fn done_without_a_step_is_a_no_op() {
        let mut spinner = StepSpinner::new(1);
        spinner.done(&[]);
        assert_eq!(spinner.index, 0);
        assert!(spinner.active.is_none());
    }
}
