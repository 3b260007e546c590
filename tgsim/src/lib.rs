//! Readers for the TGSIM I-395 trajectory export and its lane boundary table.

#[macro_use]
extern crate log;

mod centerlines;
mod error;
mod ids;
mod trajectories;

pub use centerlines::{CenterlineTable, LaneBoundary, LaneIndex};
pub use error::DataError;
pub use ids::VehicleID;
pub use trajectories::{TrajectoryRecord, TrajectoryTable};

/// Fails with every required column absent from the header, not just the first.
fn check_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<(), DataError> {
    let columns: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !columns.is_empty() {
        return Err(DataError::MissingColumns { columns });
    }
    Ok(())
}

fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}
