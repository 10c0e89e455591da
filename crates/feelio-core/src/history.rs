//! Rolling emotion history and trajectory summaries.
//!
//! Observations are kept newest-last in a fixed-capacity FIFO. The trajectory summary feeds the
//! fusion prompt so the generator sees how the user's face has moved over the last few turns,
//! not just the current frame.

use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Fixed capacity of the history buffer.
pub const HISTORY_CAPACITY: usize = 180;

/// Observations required before a trend is reported.
pub const MIN_TREND_OBSERVATIONS: usize = 4;

/// Size of the window the trend is computed over.
pub const TREND_WINDOW: usize = 20;

/// One timestamped classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionObservation {
    /// Unix seconds (fractional).
    pub timestamp: f64,
    pub label: EmotionLabel,
}

/// Recent emotional trend, rendered into the fusion prompt via `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trajectory {
    /// Not enough observations yet.
    Steady,
    /// First and last labels in the window differ.
    Shift { from: EmotionLabel, toward: EmotionLabel },
    /// Window starts and ends on the same label; carries the window's mode.
    Mostly(EmotionLabel),
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trajectory::Steady => f.write_str("steady so far"),
            Trajectory::Shift { from, toward } => write!(f, "from {} toward {}", from, toward),
            Trajectory::Mostly(label) => write!(f, "mostly {}", label),
        }
    }
}

/// Bounded FIFO of emotion observations (capacity [`HISTORY_CAPACITY`]).
#[derive(Debug, Clone, Default)]
pub struct EmotionHistory {
    observations: VecDeque<EmotionObservation>,
}

impl EmotionHistory {
    pub fn new() -> Self {
        Self {
            observations: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append an observation stamped with the current time.
    pub fn record(&mut self, label: EmotionLabel) {
        self.push(EmotionObservation {
            timestamp: crate::session::unix_now(),
            label,
        });
        debug!(target: "feelio::history", emotion = %label, "emotion recorded");
    }

    /// Append a pre-stamped observation, dropping the oldest once full.
    pub fn push(&mut self, observation: EmotionObservation) {
        self.observations.push_back(observation);
        while self.observations.len() > HISTORY_CAPACITY {
            self.observations.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EmotionObservation> {
        self.observations.iter()
    }

    /// Trend over the last [`TREND_WINDOW`] observations.
    ///
    /// When the window starts and ends on the same label the mode is reported. Ties on the mode
    /// go to the label encountered first when scanning the window oldest to newest.
    pub fn trajectory(&self) -> Trajectory {
        if self.observations.len() < MIN_TREND_OBSERVATIONS {
            return Trajectory::Steady;
        }
        let skip = self.observations.len().saturating_sub(TREND_WINDOW);
        let window: Vec<EmotionLabel> = self.observations.iter().skip(skip).map(|o| o.label).collect();

        let (first, last) = match (window.first(), window.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Trajectory::Steady,
        };
        if first != last {
            return Trajectory::Shift {
                from: first,
                toward: last,
            };
        }
        Trajectory::Mostly(mode_first_at_max(&window).unwrap_or(first))
    }

    /// String form of [`EmotionHistory::trajectory`] as placed in the fusion prompt.
    pub fn summarize(&self) -> String {
        self.trajectory().to_string()
    }
}

/// Most frequent label; among equal counts, the label that occurs earliest in the window wins.
fn mode_first_at_max(window: &[EmotionLabel]) -> Option<EmotionLabel> {
    let mut totals = [0usize; EmotionLabel::ALL.len()];
    for label in window {
        totals[index_of(*label)] += 1;
    }
    let max = *totals.iter().max()?;
    window.iter().copied().find(|label| max > 0 && totals[index_of(*label)] == max)
}

fn index_of(label: EmotionLabel) -> usize {
    EmotionLabel::ALL
        .iter()
        .position(|l| *l == label)
        .unwrap_or(0)
}
