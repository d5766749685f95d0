use crate::io::error::Error;
use crate::model::frame::Frame;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

static STEP_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"[+-]?(?:\d*\.\d+|\d+\.?\d*)(?:[Ee][+-]?\d+)?";
    Regex::new(&format!(
        r"^[ \t]*i = [ \t]+(?P<iteration>\d+),[ \t]*time = [ \t]+(?P<time>{number}),[ \t]*E = [ \t]+(?P<energy>{number})"
    ))
    .expect("step comment pattern is valid")
});

/// Iteration, time and energy from the comment line CP2K writes for each
/// MD trajectory frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdStep {
    pub iteration: u64,
    pub time: f64,
    pub energy: f64,
}

impl MdStep {
    pub fn from_comment(comment: &str) -> Option<Self> {
        let caps = STEP_COMMENT.captures(comment)?;
        Some(Self {
            iteration: caps["iteration"].parse().ok()?,
            time: caps["time"].parse().ok()?,
            energy: caps["energy"].parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartEvent {
    /// The trajectory restarts before frames that were already kept.
    EarlierRestart { iteration: u64 },
    /// The trajectory went back from `iteration`; `dropped` frames are
    /// superseded and `flushed` cached frames are kept.
    Restart {
        iteration: u64,
        dropped: u64,
        flushed: usize,
    },
}

impl fmt::Display for RestartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartEvent::EarlierRestart { .. } => write!(
                f,
                "WARNING: found earlier restart point than previous one, can not drop already flushed frames"
            ),
            RestartEvent::Restart {
                iteration,
                dropped,
                flushed,
            } => write!(
                f,
                "found restart point @{iteration}, dropping {dropped} frames, flushing {flushed}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartReport {
    pub events: Vec<RestartEvent>,
    /// Frames kept after the last restart point.
    pub remaining: usize,
}

impl RestartReport {
    /// Human-readable summary, one line per event.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(format!(
                "flushing remaining {} frames",
                self.remaining
            )))
            .collect()
    }
}

/// Removes frames of an MD trajectory that a later restart recomputed.
///
/// Whenever the iteration number does not increase, the cached frames back
/// to the restart point are discarded and the rest are kept. Frames kept
/// before an earlier restart cannot be recalled; that case is reported.
pub fn clean_restarts(frames: Vec<Frame>) -> Result<(Vec<Frame>, RestartReport), Error> {
    let mut kept = Vec::with_capacity(frames.len());
    let mut cache: Vec<Frame> = Vec::new();
    let mut report = RestartReport::default();
    let mut previous: Option<u64> = None;

    for (index, frame) in frames.into_iter().enumerate() {
        let step = MdStep::from_comment(&frame.comment).ok_or_else(|| Error::StepComment {
            frame: index + 1,
            comment: frame.comment.clone(),
        })?;

        if let Some(last) = previous
            && step.iteration <= last
        {
            let dropped = last - step.iteration + 1;
            let cached = cache.len();
            if dropped > cached as u64 {
                warn!(
                    iteration = last,
                    dropped, cached, "restart point precedes frames that were already kept"
                );
                report
                    .events
                    .push(RestartEvent::EarlierRestart { iteration: last });
            }
            let flushed = cached.saturating_sub(usize::try_from(dropped).unwrap_or(usize::MAX));
            debug!(iteration = last, dropped, flushed, "restart point");
            report.events.push(RestartEvent::Restart {
                iteration: last,
                dropped,
                flushed,
            });
            cache.truncate(flushed);
            kept.append(&mut cache);
        }

        previous = Some(step.iteration);
        cache.push(frame);
    }

    report.remaining = cache.len();
    kept.append(&mut cache);
    Ok((kept, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(iteration: u64) -> Frame {
        Frame::new(
            format!("i = {iteration:>8}, time = {:>12.3}, E = {:>20.10}", iteration as f64 * 0.5, -17.5),
            Vec::new(),
        )
    }

    fn iterations(frames: &[Frame]) -> Vec<u64> {
        frames
            .iter()
            .filter_map(|f| MdStep::from_comment(&f.comment))
            .map(|s| s.iteration)
            .collect()
    }

    #[test]
    fn parses_cp2k_step_comments() {
        let parsed = MdStep::from_comment("i =        3, time =        1.500, E =       -17.1594627486")
            .expect("step comment");
        assert_eq!(
            parsed,
            MdStep {
                iteration: 3,
                time: 1.5,
                energy: -17.1594627486,
            }
        );
        assert!(MdStep::from_comment("no comment").is_none());
    }

    #[test]
    fn monotonic_trajectory_is_untouched() {
        let (kept, report) = clean_restarts((1..=4).map(step).collect()).expect("clean");
        assert_eq!(iterations(&kept), vec![1, 2, 3, 4]);
        assert!(report.events.is_empty());
        assert_eq!(report.lines(), vec!["flushing remaining 4 frames"]);
    }

    #[test]
    fn restart_drops_recomputed_frames() {
        let frames = [1, 2, 3, 4, 5, 3, 4, 5, 6].into_iter().map(step).collect();
        let (kept, report) = clean_restarts(frames).expect("clean");
        assert_eq!(iterations(&kept), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            report.events,
            vec![RestartEvent::Restart {
                iteration: 5,
                dropped: 3,
                flushed: 2,
            }]
        );
        assert_eq!(report.remaining, 4);
    }

    #[test]
    fn earlier_restart_than_cache_is_reported() {
        let frames = [4, 3, 4].into_iter().map(step).collect();
        let (kept, report) = clean_restarts(frames).expect("clean");
        assert_eq!(iterations(&kept), vec![3, 4]);
        assert_eq!(
            report.lines(),
            vec![
                "WARNING: found earlier restart point than previous one, can not drop already flushed frames",
                "found restart point @4, dropping 2 frames, flushing 0",
                "flushing remaining 2 frames",
            ]
        );
    }

    #[test]
    fn frame_without_step_comment_is_an_error() {
        let frames = vec![step(1), Frame::new("plain", Vec::new())];
        assert!(matches!(
            clean_restarts(frames),
            Err(Error::StepComment { frame: 2, .. })
        ));
    }
}
