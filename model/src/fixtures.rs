use abstutil::Timer;

use tgsim::TrajectoryTable;

pub const HEADER: &str = "id,time,lane_kf,xloc_kf,yloc_kf,speed_kf,acceleration_kf\n";

/// Rows after the header
pub fn table(body: &str) -> TrajectoryTable {
    let input = format!("{HEADER}{body}");
    TrajectoryTable::load(input.as_bytes(), &mut Timer::throwaway()).unwrap()
}

/// (id, time, lane), with every position at (1, 1)
pub fn lanes_table(rows: &[(i64, f64, Option<i64>)]) -> TrajectoryTable {
    let mut body = String::new();
    for (id, time, lane) in rows {
        let lane = lane.map(|l| l.to_string()).unwrap_or_default();
        body.push_str(&format!("{id},{time},{lane},1.0,1.0,1.0,0.0\n"));
    }
    table(&body)
}
