#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod commands;
mod surface;

use abstutil::Timer;
use anyhow::Result;

use model::{CenterlineTable, Explorer, TrajectoryTable};

use self::surface::Surface;

const TRAJECTORY_FILE: &str = "TGSIM_I395.csv";
const CENTERLINE_FILE: &str = "boundaries/I395_boundaries.csv";
const OUTPUT_FILE: &str = "I395_Full_Plot.html";

fn main() -> Result<()> {
    abstutil::logger::setup();

    let explorer = {
        let mut timer = Timer::new("load trajectory data");
        // Without trajectories there's nothing to explore
        let trajectories = TrajectoryTable::load_file(TRAJECTORY_FILE, &mut timer)?;

        timer.start("read lane boundaries");
        // The boundaries only matter once something is plotted, so keep going without them
        let centerlines = match CenterlineTable::load_file(CENTERLINE_FILE) {
            Ok(centerlines) => Some(centerlines),
            Err(err) => {
                warn!("Centerline file not found: {CENTERLINE_FILE}: {err}");
                None
            }
        };
        timer.stop("read lane boundaries");

        Explorer::new(trajectories, centerlines, OUTPUT_FILE)
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    Surface::new(&explorer).run(stdin.lock(), &mut stdout)
}
