use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error("{column} on line {line}: can't parse {value:?}")]
    BadValue {
        column: String,
        line: u64,
        value: String,
    },
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("no trajectory records")]
    Empty,
    #[error("missing centerline source")]
    MissingCenterline,
}
