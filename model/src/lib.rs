//! Queries over recorded vehicle trajectories: which time windows and lanes can be picked, which
//! vehicles match a selection, and the scene that draws the chosen vehicles over the lane
//! boundaries.

#[macro_use]
extern crate log;

mod error;
mod explorer;
mod export;
mod options;
mod scene;
mod summary;

#[cfg(test)]
mod fixtures;

pub use tgsim::{
    CenterlineTable, DataError, LaneBoundary, LaneIndex, TrajectoryRecord, TrajectoryTable,
    VehicleID,
};

pub use self::error::{Error, SelectionError};
pub use self::explorer::Explorer;
pub use self::export::{render_html, write_html};
pub use self::options::{derive_options, LaneFilter, Options, TimeWindow, WINDOW_SECONDS};
pub use self::scene::{
    build_scene, Axis, LineTrace, Scene, TextPosition, TextTrace, Trace, VehicleTrace,
    CENTERLINE_SCALE,
};
pub use self::summary::{count_lane_changes, summarize, Filters, VehicleSummary};
