use std::path::{Path, PathBuf};

use abstutil::prettyprint_usize;

use tgsim::{CenterlineTable, TrajectoryTable, VehicleID};

use crate::{
    build_scene, derive_options, summarize, write_html, Error, Filters, Options, Scene,
    SelectionError, VehicleSummary,
};

/// What the selection widgets call into. Every call takes the full selection it depends on; nothing
/// here changes after construction.
pub struct Explorer {
    trajectories: TrajectoryTable,
    // None if the boundary file couldn't be loaded. Only plotting needs it.
    centerlines: Option<CenterlineTable>,
    output_path: PathBuf,
    options: Options,
}

impl Explorer {
    pub fn new<P: Into<PathBuf>>(
        trajectories: TrajectoryTable,
        centerlines: Option<CenterlineTable>,
        output_path: P,
    ) -> Self {
        let options = derive_options(&trajectories);
        info!(
            "Exploring {} vehicles over {} time windows",
            prettyprint_usize(trajectories.num_vehicles()),
            prettyprint_usize(options.time_windows.len() - 1)
        );
        Self {
            trajectories,
            centerlines,
            output_path: output_path.into(),
            options,
        }
    }

    /// Starts with "all"
    pub fn time_window_options(&self) -> &[String] {
        &self.options.time_windows
    }

    /// Starts with "all". The same list applies to the initial and exit lane.
    pub fn lane_options(&self) -> &[String] {
        &self.options.lanes
    }

    /// The vehicles matching the dropdowns. Use `VehicleSummary::describe` to list them.
    pub fn on_filter_changed(
        &self,
        time_window: &str,
        initial_lane: &str,
        exit_lane: &str,
    ) -> Result<Vec<VehicleSummary>, SelectionError> {
        let filters = Filters::parse(time_window, initial_lane, exit_lane)?;
        Ok(summarize(&self.trajectories, &filters))
    }

    /// Builds the scene and overwrites the output file with it. Nothing is written if the scene
    /// can't be built.
    pub fn on_plot_requested(&self, vehicle_ids: &[VehicleID]) -> Result<Scene, Error> {
        let scene = build_scene(
            &self.trajectories,
            self.centerlines.as_ref(),
            vehicle_ids,
        )?;
        write_html(&scene, &self.output_path)?;
        Ok(scene)
    }

    pub fn trajectories(&self) -> &TrajectoryTable {
        &self.trajectories
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
