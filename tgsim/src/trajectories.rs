use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use abstutil::{prettyprint_usize, Timer};
use serde::{Deserialize, Serialize};

use crate::{DataError, VehicleID};

// The TGSIM export carries Kalman-filtered variants of each measurement
const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "time",
    "lane_kf",
    "xloc_kf",
    "yloc_kf",
    "speed_kf",
    "acceleration_kf",
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryRecord {
    pub id: VehicleID,
    /// Seconds
    pub time: f64,
    pub lane: Option<i64>,
    pub x: f64,
    pub y: f64,
    /// m/s
    pub speed: f64,
    /// m/s^2
    pub acceleration: f64,
}

/// Every record, grouped by vehicle. Read-only once built.
pub struct TrajectoryTable {
    // Each series is sorted by time
    vehicles: BTreeMap<VehicleID, Vec<TrajectoryRecord>>,
    num_records: usize,
    min_time: f64,
    max_time: f64,
    max_x: f64,
    max_y: f64,
}

impl TrajectoryTable {
    /// Fails if there are no records.
    pub fn new(records: Vec<TrajectoryRecord>) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty);
        }

        let num_records = records.len();
        let mut min_time = f64::INFINITY;
        let mut max_time = f64::NEG_INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut vehicles: BTreeMap<VehicleID, Vec<TrajectoryRecord>> = BTreeMap::new();
        for rec in records {
            min_time = min_time.min(rec.time);
            max_time = max_time.max(rec.time);
            max_x = max_x.max(rec.x);
            max_y = max_y.max(rec.y);
            vehicles.entry(rec.id).or_insert_with(Vec::new).push(rec);
        }
        // The file isn't necessarily in order. The sort is stable, so duplicate timestamps keep
        // their file order.
        for series in vehicles.values_mut() {
            series.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        Ok(Self {
            vehicles,
            num_records,
            min_time,
            max_time,
            max_x,
            max_y,
        })
    }

    pub fn load<R: std::io::Read>(reader: R, timer: &mut Timer) -> Result<Self, DataError> {
        // Always stop the span, even when the file is bad
        timer.start("read trajectory records");
        let result = read_records(reader);
        timer.stop("read trajectory records");
        let (records, missing_lanes) = result?;

        timer.start("group trajectories by vehicle");
        let table = Self::new(records);
        timer.stop("group trajectories by vehicle");
        let table = table?;

        info!(
            "Loaded {} trajectory records for {} vehicles",
            prettyprint_usize(table.num_records),
            prettyprint_usize(table.vehicles.len())
        );
        if missing_lanes > 0 {
            warn!(
                "{} trajectory records have no lane",
                prettyprint_usize(missing_lanes)
            );
        }
        Ok(table)
    }

    pub fn load_file<P: AsRef<Path>>(path: P, timer: &mut Timer) -> Result<Self, DataError> {
        let file = fs_err::File::open(path.as_ref())?;
        Self::load(file, timer)
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleID> + '_ {
        self.vehicles.keys().cloned()
    }

    /// All records for one vehicle, sorted by time. Empty for unknown vehicles.
    pub fn series(&self, id: VehicleID) -> &[TrajectoryRecord] {
        self.vehicles.get(&id).map(|x| x.as_slice()).unwrap_or(&[])
    }

    /// Every vehicle with its series, in increasing ID order
    pub fn iter(&self) -> impl Iterator<Item = (VehicleID, &[TrajectoryRecord])> {
        self.vehicles.iter().map(|(id, series)| (*id, series.as_slice()))
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// (earliest, latest) timestamp over all records
    pub fn time_range(&self) -> (f64, f64) {
        (self.min_time, self.max_time)
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Distinct lanes that appear anywhere, sorted
    pub fn lanes(&self) -> BTreeSet<i64> {
        self.vehicles
            .values()
            .flat_map(|series| series.iter().filter_map(|rec| rec.lane))
            .collect()
    }
}

// Also counts the records without a lane
fn read_records<R: std::io::Read>(reader: R) -> Result<(Vec<TrajectoryRecord>, usize), DataError> {
    let mut reader = crate::csv_reader(reader);
    let headers = reader.headers()?.clone();
    crate::check_columns(&headers, &REQUIRED_COLUMNS)?;

    let mut records = Vec::new();
    let mut missing_lanes = 0;
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|pos| pos.line()).unwrap_or(0);
        let rec: Record = row.deserialize(Some(&headers))?;
        // Time and position bound the time windows and the plot frame
        let time = finite(rec.time, "time", line)?;
        let x = finite(rec.xloc_kf, "xloc_kf", line)?;
        let y = finite(rec.yloc_kf, "yloc_kf", line)?;
        // pandas leaves NaN in the lane column when the filter lost track of the lane
        let lane = match rec.lane_kf {
            Some(lane) if lane.is_finite() => Some(lane.trunc() as i64),
            _ => {
                missing_lanes += 1;
                None
            }
        };
        records.push(TrajectoryRecord {
            id: rec.id,
            time,
            lane,
            x,
            y,
            speed: rec.speed_kf,
            acceleration: rec.acceleration_kf,
        });
    }
    Ok((records, missing_lanes))
}

fn finite(value: f64, column: &str, line: u64) -> Result<f64, DataError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataError::BadValue {
            column: column.to_string(),
            line,
            value: value.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct Record {
    id: VehicleID,
    time: f64,
    lane_kf: Option<f64>,
    xloc_kf: f64,
    yloc_kf: f64,
    speed_kf: f64,
    acceleration_kf: f64,
}
