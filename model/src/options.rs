use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use tgsim::TrajectoryTable;

use crate::SelectionError;

/// Width of every selectable time window
pub const WINDOW_SECONDS: i64 = 60;

const ALL: &str = "all";

/// Everything the user can pick before any vehicles are listed. Both lists start with "all".
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Options {
    pub time_windows: Vec<String>,
    pub lanes: Vec<String>,
}

/// Windows step from the earliest timestamp (truncated to whole seconds) while the start is still
/// before the latest timestamp. The last window isn't clamped, so its label can run past the data.
pub fn derive_options(trajectories: &TrajectoryTable) -> Options {
    let (min_time, max_time) = trajectories.time_range();

    let mut time_windows = vec![TimeWindow::All.to_string()];
    let mut start = min_time.trunc() as i64;
    while (start as f64) < max_time {
        time_windows.push(
            TimeWindow::Range {
                start,
                end: start + WINDOW_SECONDS,
            }
            .to_string(),
        );
        start += WINDOW_SECONDS;
    }

    let mut lanes = vec![LaneFilter::All.to_string()];
    lanes.extend(
        trajectories
            .lanes()
            .into_iter()
            .map(|lane| LaneFilter::Lane(lane).to_string()),
    );

    debug!(
        "{} time windows and {} lanes to choose from",
        time_windows.len() - 1,
        lanes.len() - 1
    );
    Options { time_windows, lanes }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeWindow {
    All,
    /// Inclusive on both ends
    Range { start: i64, end: i64 },
}

impl TimeWindow {
    pub fn contains(&self, time: f64) -> bool {
        match self {
            TimeWindow::All => true,
            TimeWindow::Range { start, end } => *start as f64 <= time && time <= *end as f64,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeWindow::All => write!(f, "{ALL}"),
            TimeWindow::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        if s == ALL {
            return Ok(TimeWindow::All);
        }
        let invalid = || SelectionError::InvalidTimeWindow(raw.to_string());
        // Skip the first character, so a negative start isn't taken as the separator
        let (split, _) = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .ok_or_else(invalid)?;
        let start = s[..split].parse::<i64>().map_err(|_| invalid())?;
        let end = s[split + 1..].parse::<i64>().map_err(|_| invalid())?;
        Ok(TimeWindow::Range { start, end })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaneFilter {
    All,
    Lane(i64),
}

impl LaneFilter {
    /// A missing lane only matches `All`.
    pub fn matches(&self, lane: Option<i64>) -> bool {
        match self {
            LaneFilter::All => true,
            LaneFilter::Lane(want) => lane == Some(*want),
        }
    }
}

impl fmt::Display for LaneFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LaneFilter::All => write!(f, "{ALL}"),
            LaneFilter::Lane(lane) => write!(f, "{lane}"),
        }
    }
}

impl FromStr for LaneFilter {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        if s == ALL {
            return Ok(LaneFilter::All);
        }
        s.parse::<i64>()
            .map(LaneFilter::Lane)
            .map_err(|_| SelectionError::InvalidLane(raw.to_string()))
    }
}
