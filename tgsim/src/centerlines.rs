use std::path::Path;

use crate::DataError;

/// The part of an `x<N>` column name after the `x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaneIndex {
    Numbered(i64),
    /// The suffix wasn't an integer; it's kept as-is for labelling.
    Other(String),
}

impl LaneIndex {
    fn parse(suffix: &str) -> Self {
        match suffix.parse::<i64>() {
            Ok(idx) => LaneIndex::Numbered(idx),
            Err(_) => LaneIndex::Other(suffix.to_string()),
        }
    }
}

/// One lane's left boundary, in the file's coordinate space
#[derive(Clone, Debug, PartialEq)]
pub struct LaneBoundary {
    pub column: String,
    pub index: LaneIndex,
    // Only rows where both x and y are present, in file order
    pub points: Vec<(f64, f64)>,
}

pub struct CenterlineTable {
    // In header order
    pub lanes: Vec<LaneBoundary>,
}

impl CenterlineTable {
    /// Every `x<N>` column pairs with the one shared `y` column.
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = crate::csv_reader(reader);
        let headers = reader.headers()?.clone();
        crate::check_columns(&headers, &["y"])?;

        let mut y_idx = 0;
        let mut lane_columns = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            if name == "y" {
                y_idx = idx;
            } else if let Some(suffix) = name.strip_prefix('x') {
                if suffix.is_empty() {
                    warn!("Ignoring centerline column {name:?} without a lane index");
                    continue;
                }
                lane_columns.push((
                    idx,
                    LaneBoundary {
                        column: name.to_string(),
                        index: LaneIndex::parse(suffix),
                        points: Vec::new(),
                    },
                ));
            }
        }

        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|pos| pos.line()).unwrap_or(0);
            let y = parse_cell(&row, y_idx, "y", line)?;
            for (idx, lane) in &mut lane_columns {
                let x = parse_cell(&row, *idx, &lane.column, line)?;
                if let (Some(x), Some(y)) = (x, y) {
                    lane.points.push((x, y));
                }
            }
        }

        let lanes: Vec<LaneBoundary> = lane_columns.into_iter().map(|(_, lane)| lane).collect();
        info!("Loaded {} lane boundaries", lanes.len());
        Ok(Self { lanes })
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = fs_err::File::open(path.as_ref())?;
        Self::load(file)
    }
}

// Empty cells and NaN are both missing. Infinities are an error.
fn parse_cell(
    row: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<Option<f64>, DataError> {
    let value = row.get(idx).unwrap_or("");
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(x) if x.is_nan() => Ok(None),
        Ok(x) if x.is_finite() => Ok(Some(x)),
        _ => Err(DataError::BadValue {
            column: column.to_string(),
            line,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_each_lane_with_shared_y() {
        let input = "x1,x2,y\n\
                     10.0,20.0,0.0\n\
                     11.0,,1.0\n\
                     12.0,22.0,\n\
                     NaN,23.0,3.0\n";
        let table = CenterlineTable::load(input.as_bytes()).unwrap();
        assert_eq!(table.lanes.len(), 2);

        assert_eq!(table.lanes[0].column, "x1");
        assert_eq!(table.lanes[0].index, LaneIndex::Numbered(1));
        assert_eq!(table.lanes[0].points, vec![(10.0, 0.0), (11.0, 1.0)]);

        assert_eq!(table.lanes[1].index, LaneIndex::Numbered(2));
        assert_eq!(table.lanes[1].points, vec![(20.0, 0.0), (23.0, 3.0)]);
    }

    #[test]
    fn non_numeric_suffix_is_kept() {
        let input = "y,xshoulder,x\n1.0,2.0,3.0\n";
        let table = CenterlineTable::load(input.as_bytes()).unwrap();
        assert_eq!(table.lanes.len(), 1);
        assert_eq!(
            table.lanes[0].index,
            LaneIndex::Other("shoulder".to_string())
        );
        assert_eq!(table.lanes[0].points, vec![(2.0, 1.0)]);
    }

    #[test]
    fn requires_y() {
        let input = "x1,x2\n1.0,2.0\n";
        assert!(matches!(
            CenterlineTable::load(input.as_bytes()),
            Err(DataError::MissingColumns { .. })
        ));
    }

    #[test]
    fn bad_cell_names_the_line() {
        let input = "x1,y\n1.0,2.0\nabc,3.0\n";
        match CenterlineTable::load(input.as_bytes()) {
            Err(DataError::BadValue {
                column,
                line,
                value,
            }) => {
                assert_eq!(column, "x1");
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            _ => panic!("expected BadValue"),
        }
    }

    #[test]
    fn infinite_cell_is_an_error() {
        let input = "x1,y
1.0,2.0
2.0,inf
";
        assert!(matches!(
            CenterlineTable::load(input.as_bytes()),
            Err(DataError::BadValue { ref column, line: 3, .. }) if column == "y"
        ));
    }
}
