use serde::Serialize;

use tgsim::{TrajectoryRecord, TrajectoryTable, VehicleID};

use crate::{LaneFilter, SelectionError, TimeWindow};

/// How one vehicle moved between lanes over its whole recorded trajectory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VehicleSummary {
    pub id: VehicleID,
    pub initial_lane: Option<i64>,
    pub exit_lane: Option<i64>,
    pub lane_change_count: usize,
}

impl VehicleSummary {
    /// None for an empty series. The series must be sorted by time.
    pub fn from_series(id: VehicleID, series: &[TrajectoryRecord]) -> Option<Self> {
        Some(Self {
            id,
            initial_lane: series.first()?.lane,
            exit_lane: series.last()?.lane,
            lane_change_count: count_lane_changes(series),
        })
    }

    pub fn describe(&self) -> String {
        format!("{} ({} lane changes)", self.id, self.lane_change_count)
    }
}

/// Adjacent records with different lanes. Losing or regaining the lane counts as a change too.
pub fn count_lane_changes(series: &[TrajectoryRecord]) -> usize {
    series
        .windows(2)
        .filter(|pair| pair[0].lane != pair[1].lane)
        .count()
}

/// One selection of the time and lane dropdowns
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filters {
    pub time_window: TimeWindow,
    pub initial_lane: LaneFilter,
    pub exit_lane: LaneFilter,
}

impl Filters {
    pub fn all() -> Self {
        Self {
            time_window: TimeWindow::All,
            initial_lane: LaneFilter::All,
            exit_lane: LaneFilter::All,
        }
    }

    pub fn parse(
        time_window: &str,
        initial_lane: &str,
        exit_lane: &str,
    ) -> Result<Self, SelectionError> {
        Ok(Self {
            time_window: time_window.parse()?,
            initial_lane: initial_lane.parse()?,
            exit_lane: exit_lane.parse()?,
        })
    }
}

/// Vehicles with at least one record inside the time window, summarized over all of their records
/// (not just the ones in the window), then narrowed by the lane filters. Sorted by ID.
pub fn summarize(trajectories: &TrajectoryTable, filters: &Filters) -> Vec<VehicleSummary> {
    let mut results = Vec::new();
    let mut in_window = 0;
    for (id, series) in trajectories.iter() {
        if !series
            .iter()
            .any(|rec| filters.time_window.contains(rec.time))
        {
            continue;
        }
        in_window += 1;

        if let Some(summary) = VehicleSummary::from_series(id, series) {
            if filters.initial_lane.matches(summary.initial_lane)
                && filters.exit_lane.matches(summary.exit_lane)
            {
                results.push(summary);
            }
        }
    }
    debug!(
        "{} vehicles in {}, {} after lane filters",
        in_window,
        filters.time_window,
        results.len()
    );
    results
}
