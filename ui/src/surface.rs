use std::io::{BufRead, Write};

use anyhow::Result;

use model::{Explorer, LaneFilter, Scene, TimeWindow, VehicleID, VehicleSummary};

use crate::commands::{self, Command, HELP};

/// A terminal stand-in for the dropdowns and vehicle list. All of the selection state lives here;
/// the explorer only ever sees explicit arguments.
pub struct Surface<'a> {
    explorer: &'a Explorer,

    // Unset until the user picks one, like an empty dropdown
    time_window: Option<String>,
    initial_lane: String,
    exit_lane: String,

    listed: Vec<VehicleSummary>,
    selected: Vec<VehicleID>,
}

impl<'a> Surface<'a> {
    pub fn new(explorer: &'a Explorer) -> Self {
        Self {
            explorer,
            time_window: None,
            initial_lane: LaneFilter::All.to_string(),
            exit_lane: LaneFilter::All.to_string(),
            listed: Vec::new(),
            selected: Vec::new(),
        }
    }

    /// Reads commands until the input ends or the user quits. Mistakes are reported and the loop
    /// keeps going; only IO errors on the terminal itself end it.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Vehicle Trajectory Plotter")?;
        writeln!(out, "{HELP}")?;

        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let result = commands::parse(&line).and_then(|cmd| match cmd {
                Some(Command::Quit) => Ok(false),
                Some(cmd) => self.execute(cmd, out).map(|_| true),
                None => Ok(true),
            });
            match result {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => writeln!(out, "Error: {err}")?,
            }
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<()> {
        match cmd {
            Command::Times => print_options(out, self.explorer.time_window_options())?,
            Command::Lanes => print_options(out, self.explorer.lane_options())?,
            Command::SetTimeWindow(window) => {
                window.parse::<TimeWindow>()?;
                self.time_window = Some(window);
                self.refresh(out)?;
            }
            Command::SetInitialLane(lane) => {
                lane.parse::<LaneFilter>()?;
                self.initial_lane = lane;
                if self.time_window.is_some() {
                    self.refresh(out)?;
                }
            }
            Command::SetExitLane(lane) => {
                lane.parse::<LaneFilter>()?;
                self.exit_lane = lane;
                if self.time_window.is_some() {
                    self.refresh(out)?;
                }
            }
            Command::List => self.refresh(out)?,
            Command::Select(positions) => {
                let mut selected = Vec::new();
                for pos in positions {
                    match self.listed.get(pos - 1) {
                        Some(summary) => selected.push(summary.id),
                        None => bail!(
                            "there's no vehicle {pos}; the list has {}",
                            self.listed.len()
                        ),
                    }
                }
                self.selected = selected;
                let names: Vec<String> = self.selected.iter().map(|id| id.to_string()).collect();
                writeln!(out, "Selected {}", names.join(", "))?;
            }
            Command::Plot => {
                let scene = self.explorer.on_plot_requested(&self.selected)?;
                self.display(out, &scene)?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    // Any change to the filters replaces the list and clears the selection
    fn refresh<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let time_window = match self.time_window {
            Some(ref window) => window,
            None => bail!("pick a time window first"),
        };
        let listed =
            self.explorer
                .on_filter_changed(time_window, &self.initial_lane, &self.exit_lane)?;
        self.listed = listed;
        self.selected.clear();

        writeln!(
            out,
            "{} vehicles in {}, initial lane {}, exit lane {}",
            self.listed.len(),
            time_window,
            self.initial_lane,
            self.exit_lane
        )?;
        for (idx, summary) in self.listed.iter().enumerate() {
            writeln!(out, "  {:>4}. {}", idx + 1, summary.describe())?;
        }
        Ok(())
    }

    fn display<W: Write>(&self, out: &mut W, scene: &Scene) -> Result<()> {
        writeln!(out, "{}", scene.title)?;
        writeln!(
            out,
            "  {}: 0 to {:.2}, {}: 0 to {:.2}",
            scene.x_axis.title, scene.x_axis.range.1, scene.y_axis.title, scene.y_axis.range.1
        )?;
        writeln!(out, "  {} lane boundaries", scene.centerlines().count())?;
        for vehicle in scene.vehicles() {
            writeln!(
                out,
                "  {} ({}): {} points",
                vehicle.name,
                vehicle.color,
                vehicle.points.len()
            )?;
        }
        writeln!(out, "Wrote {}", self.explorer.output_path().display())?;
        Ok(())
    }
}

fn print_options<W: Write>(out: &mut W, options: &[String]) -> Result<()> {
    writeln!(out, "{}", options.join(", "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use abstutil::Timer;

    use model::{CenterlineTable, TrajectoryTable};

    use super::*;

    const TRAJECTORIES: &str = "\
id,time,lane_kf,xloc_kf,yloc_kf,speed_kf,acceleration_kf
7,0,2,10.0,100.0,20.0,0.1
7,10,3,12.0,150.0,20.5,0.2
8,70,1,30.0,40.0,15.0,-0.5
9,80,1,50.0,60.0,25.0,0.0
";

    fn explorer(name: &str, with_centerlines: bool) -> Explorer {
        let trajectories =
            TrajectoryTable::load(TRAJECTORIES.as_bytes(), &mut Timer::throwaway()).unwrap();
        let centerlines = if with_centerlines {
            Some(CenterlineTable::load("x1,y\n1.0,1.0\n2.0,5.0\n".as_bytes()).unwrap())
        } else {
            None
        };
        let path = std::env::temp_dir().join(format!("ui-{name}-{}.html", std::process::id()));
        Explorer::new(trajectories, centerlines, path)
    }

    fn run(explorer: &Explorer, script: &str) -> String {
        let mut out = Vec::new();
        Surface::new(explorer)
            .run(script.as_bytes(), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_select_and_plot() {
        let explorer = explorer("plot", true);
        let out = run(
            &explorer,
            "time 60-120\ninitial 1\nselect 2 1\nplot\nquit\nplot\n",
        );
        assert!(out.contains("2 vehicles in 60-120, initial lane all, exit lane all"));
        assert!(out.contains("   1. 8 (0 lane changes)"));
        assert!(out.contains("2 vehicles in 60-120, initial lane 1, exit lane all"));
        assert!(out.contains("Selected 9, 8"));
        assert!(out.contains("  Vehicle 9 (#1f77b4): 1 points"));
        assert!(out.contains("  Vehicle 8 (#ff7f0e): 1 points"));
        assert!(out.contains("  1 lane boundaries"));
        // Nothing runs after quit
        assert_eq!(out.matches("Wrote").count(), 1);
        assert!(explorer.output_path().exists());
        fs_err::remove_file(explorer.output_path()).unwrap();
    }

    #[test]
    fn errors_are_reported_and_the_loop_continues() {
        let explorer = explorer("errors", false);
        let out = run(
            &explorer,
            "list\ntime later\ninitial left\nplot\ntime all\nselect 5\nselect 1\nplot\ntimes\n",
        );
        assert!(out.contains("Error: pick a time window first"));
        assert!(out.contains("Error: invalid time window \"later\""));
        assert!(out.contains("Error: invalid lane \"left\""));
        assert!(out.contains("Error: no vehicles selected"));
        assert!(out.contains("3 vehicles in all"));
        assert!(out.contains("Error: there's no vehicle 5; the list has 3"));
        assert!(out.contains("Error: missing centerline source"));
        assert!(out.contains("all, 0-60, 60-120"));
        assert!(!explorer.output_path().exists());
    }

    #[test]
    fn changing_filters_clears_the_selection() {
        let explorer = explorer("clear", true);
        let out = run(&explorer, "time all\nselect 1\nexit 3\nplot\n");
        assert!(out.contains("1 vehicles in all, initial lane all, exit lane 3"));
        assert!(out.contains("Error: no vehicles selected"));
    }
}
