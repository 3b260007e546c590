use std::collections::BTreeSet;

use serde::Serialize;

use tgsim::{CenterlineTable, DataError, LaneBoundary, LaneIndex, TrajectoryTable, VehicleID};

use crate::{Error, SelectionError};

/// The boundary file is in different units than the trajectories.
pub const CENTERLINE_SCALE: f64 = 0.3;
const CENTERLINE_COLOR: &str = "#D3D3D3";
const CENTERLINE_WIDTH: f64 = 1.5;
// Raw boundary column N is the left edge of lane -(6 - N)
const LOGICAL_LANE_OFFSET: i64 = 6;

const VEHICLE_MARKER_SIZE: f64 = 5.0;
const VEHICLE_LINE_WIDTH: f64 = 2.0;

/// Everything needed to draw one plot request, independent of how it's displayed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub legend_title: String,
    /// In drawing order: lane boundaries and their labels first, then vehicles
    pub traces: Vec<Trace>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    /// (min, max)
    pub range: (f64, f64),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Centerline(LineTrace),
    Label(TextTrace),
    Vehicle(VehicleTrace),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub color: String,
    pub width: f64,
    pub points: Vec<(f64, f64)>,
}

/// Text with no legend entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextTrace {
    pub text: String,
    pub pos: (f64, f64),
    pub text_position: TextPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    TopCenter,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleTrace {
    pub id: VehicleID,
    pub name: String,
    pub color: String,
    pub marker_size: f64,
    pub line_width: f64,
    /// In time order
    pub points: Vec<(f64, f64)>,
    /// One per point
    pub hover: Vec<String>,
}

impl Scene {
    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleTrace> {
        self.traces.iter().filter_map(|trace| match trace {
            Trace::Vehicle(v) => Some(v),
            _ => None,
        })
    }

    pub fn centerlines(&self) -> impl Iterator<Item = &LineTrace> {
        self.traces.iter().filter_map(|trace| match trace {
            Trace::Centerline(line) => Some(line),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &TextTrace> {
        self.traces.iter().filter_map(|trace| match trace {
            Trace::Label(label) => Some(label),
            _ => None,
        })
    }
}

/// Draws the chosen vehicles over the lane boundaries. Colors follow the order of `vehicle_ids`.
/// The axes always span the whole trajectory table, so the frame doesn't jump between selections.
pub fn build_scene(
    trajectories: &TrajectoryTable,
    centerlines: Option<&CenterlineTable>,
    vehicle_ids: &[VehicleID],
) -> Result<Scene, Error> {
    if vehicle_ids.is_empty() {
        return Err(SelectionError::NoVehiclesSelected.into());
    }
    let centerlines = centerlines.ok_or(DataError::MissingCenterline)?;

    let mut traces = Vec::new();
    for lane in &centerlines.lanes {
        draw_lane_boundary(lane, &mut traces);
    }

    // Selecting the same vehicle twice doesn't draw it twice
    let mut seen = BTreeSet::new();
    let vehicle_ids: Vec<VehicleID> = vehicle_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .cloned()
        .collect();
    for (idx, id) in vehicle_ids.iter().enumerate() {
        let series = trajectories.series(*id);
        if series.is_empty() {
            debug!("Vehicle {id} has no records, not drawing it");
            continue;
        }
        traces.push(Trace::Vehicle(VehicleTrace {
            id: *id,
            name: format!("Vehicle {id}"),
            color: palette_color(idx),
            marker_size: VEHICLE_MARKER_SIZE,
            line_width: VEHICLE_LINE_WIDTH,
            points: series.iter().map(|rec| (rec.x, rec.y)).collect(),
            hover: series
                .iter()
                .map(|rec| {
                    let lane = match rec.lane {
                        Some(lane) => lane.to_string(),
                        None => "n/a".to_string(),
                    };
                    // Debug keeps the decimal point, like the float column it came from
                    format!(
                        "ID:{}\nTime: {:?}s\nLane: {}\nSpeed: {:.2} m/s\nAcceleration: {:.2} m/s²",
                        id, rec.time, lane, rec.speed, rec.acceleration
                    )
                })
                .collect(),
        }));
    }

    Ok(Scene {
        title: "Vehicle Trajectories".to_string(),
        x_axis: Axis {
            title: "X Coordinate".to_string(),
            range: (0.0, trajectories.max_x()),
        },
        y_axis: Axis {
            title: "Y Coordinate".to_string(),
            range: (0.0, trajectories.max_y()),
        },
        legend_title: "Legend".to_string(),
        traces,
    })
}

fn draw_lane_boundary(lane: &LaneBoundary, traces: &mut Vec<Trace>) {
    // The label sits at the northernmost point. The first one wins ties.
    let mut top: Option<(f64, f64)> = None;
    for pt in &lane.points {
        if top.map(|(_, y)| pt.1 > y).unwrap_or(true) {
            top = Some(*pt);
        }
    }
    let top = match top {
        Some(pt) => pt,
        None => {
            warn!("Lane boundary {} has no points", lane.column);
            return;
        }
    };

    let label = lane_label(&lane.index);
    traces.push(Trace::Centerline(LineTrace {
        name: label.clone(),
        color: CENTERLINE_COLOR.to_string(),
        width: CENTERLINE_WIDTH,
        points: lane
            .points
            .iter()
            .map(|(x, y)| (x * CENTERLINE_SCALE, y * CENTERLINE_SCALE))
            .collect(),
    }));
    traces.push(Trace::Label(TextTrace {
        text: label,
        pos: (top.0 * CENTERLINE_SCALE, top.1 * CENTERLINE_SCALE),
        text_position: TextPosition::TopCenter,
    }));
}

fn lane_label(index: &LaneIndex) -> String {
    match index {
        LaneIndex::Numbered(raw) => {
            format!("Lane {}\nleft boundary", -(LOGICAL_LANE_OFFSET - raw))
        }
        LaneIndex::Other(raw) => format!("Lane {raw}\nleft boundary"),
    }
}

// The classic Tableau colors, reused once exhausted
fn palette_color(idx: usize) -> String {
    let palette = colorous::CATEGORY10;
    let color = palette[idx % palette.len()];
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::table;

    fn trajectories() -> TrajectoryTable {
        table(
            "1,0,2,10.0,100.0,12.346,0.5\n\
             1,10,3,20.0,110.0,13.0,-0.25\n\
             2,0,1,5.0,50.0,8.0,0.0\n\
             2,12.5,,6.0,60.0,8.0,0.0\n\
             3,0,1,500.0,900.0,30.0,1.0\n",
        )
    }

    fn centerlines() -> CenterlineTable {
        CenterlineTable::load(
            "x1,x3,y\n\
             100.0,300.0,0.0\n\
             110.0,,50.0\n\
             120.0,320.0,40.0\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn no_vehicles_selected() {
        let err = build_scene(&trajectories(), Some(&centerlines()), &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Selection(SelectionError::NoVehiclesSelected)
        ));
    }

    #[test]
    fn missing_centerlines() {
        let err = build_scene(&trajectories(), None, &[VehicleID(1)]).unwrap_err();
        assert!(matches!(err, Error::Data(DataError::MissingCenterline)));
    }

    #[test]
    fn lane_boundaries_are_scaled_and_labelled() {
        let scene = build_scene(&trajectories(), Some(&centerlines()), &[VehicleID(1)]).unwrap();

        let lines: Vec<&LineTrace> = scene.centerlines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Lane -5\nleft boundary");
        assert_eq!(lines[0].color, "#D3D3D3");
        assert_eq!(lines[0].points.len(), 3);
        assert!((lines[0].points[1].0 - 33.0).abs() < 1e-9);
        assert!((lines[0].points[1].1 - 15.0).abs() < 1e-9);
        // The row missing x3 is dropped from that lane only
        assert_eq!(lines[1].name, "Lane -3\nleft boundary");
        assert_eq!(lines[1].points.len(), 2);

        let labels: Vec<&TextTrace> = scene.labels().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].text, "Lane -5\nleft boundary");
        assert_eq!(labels[0].text_position, TextPosition::TopCenter);
        assert!((labels[0].pos.0 - 33.0).abs() < 1e-9);
        assert!((labels[0].pos.1 - 15.0).abs() < 1e-9);
        // x3 has no point at y=50, so its highest is y=40
        assert!((labels[1].pos.0 - 96.0).abs() < 1e-9);
        assert!((labels[1].pos.1 - 12.0).abs() < 1e-9);
    }

    #[test]
    fn label_ties_go_to_the_first_point() {
        let centerlines =
            CenterlineTable::load("x6,y\n1.0,5.0\n2.0,5.0\n3.0,4.0\n".as_bytes()).unwrap();
        let scene = build_scene(&trajectories(), Some(&centerlines), &[VehicleID(1)]).unwrap();
        let label = scene.labels().next().unwrap();
        assert_eq!(label.text, "Lane 0\nleft boundary");
        assert!((label.pos.0 - 0.3).abs() < 1e-9);
    }

    #[test]
    fn axes_cover_the_whole_table() {
        let trajectories = trajectories();
        let centerlines = centerlines();
        for ids in [vec![VehicleID(1)], vec![VehicleID(2), VehicleID(3)]] {
            let scene = build_scene(&trajectories, Some(&centerlines), &ids).unwrap();
            assert_eq!(scene.x_axis.range, (0.0, 500.0));
            assert_eq!(scene.y_axis.range, (0.0, 900.0));
        }
    }

    #[test]
    fn vehicle_traces() {
        let scene = build_scene(
            &trajectories(),
            Some(&centerlines()),
            &[VehicleID(2), VehicleID(1)],
        )
        .unwrap();
        let vehicles: Vec<&VehicleTrace> = scene.vehicles().collect();
        assert_eq!(vehicles.len(), 2);

        // Colors follow selection order, not ID order
        assert_eq!(vehicles[0].name, "Vehicle 2");
        assert_eq!(vehicles[0].color, "#1f77b4");
        assert_eq!(vehicles[1].name, "Vehicle 1");
        assert_eq!(vehicles[1].color, "#ff7f0e");

        // Unscaled positions
        assert_eq!(vehicles[1].points, vec![(10.0, 100.0), (20.0, 110.0)]);
        assert_eq!(
            vehicles[1].hover[0],
            "ID:1\nTime: 0.0s\nLane: 2\nSpeed: 12.35 m/s\nAcceleration: 0.50 m/s²"
        );
        assert_eq!(
            vehicles[1].hover[1],
            "ID:1\nTime: 10.0s\nLane: 3\nSpeed: 13.00 m/s\nAcceleration: -0.25 m/s²"
        );
        assert_eq!(
            vehicles[0].hover[1],
            "ID:2\nTime: 12.5s\nLane: n/a\nSpeed: 8.00 m/s\nAcceleration: 0.00 m/s²"
        );
    }

    #[test]
    fn unknown_vehicles_are_skipped() {
        let scene = build_scene(
            &trajectories(),
            Some(&centerlines()),
            &[VehicleID(42), VehicleID(3)],
        )
        .unwrap();
        let vehicles: Vec<&VehicleTrace> = scene.vehicles().collect();
        assert_eq!(vehicles.len(), 1);
        // The skipped vehicle still used up the first color
        assert_eq!(vehicles[0].color, "#ff7f0e");
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), palette_color(10));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn duplicate_selection_draws_once() {
        let scene = build_scene(
            &trajectories(),
            Some(&centerlines()),
            &[VehicleID(1), VehicleID(1)],
        )
        .unwrap();
        assert_eq!(scene.vehicles().count(), 1);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let trajectories = trajectories();
        let centerlines = centerlines();
        let ids = [VehicleID(1), VehicleID(2)];
        assert_eq!(
            build_scene(&trajectories, Some(&centerlines), &ids).unwrap(),
            build_scene(&trajectories, Some(&centerlines), &ids).unwrap()
        );
    }
}
