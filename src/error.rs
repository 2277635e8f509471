use arrow_schema::ArrowError;
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Data Error: {0}")]
    Data(String),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid timestamp in row {row}, column {column}: {value}")]
    InvalidTimestamp {
        row: usize,
        column: &'static str,
        value: i64,
    },
    #[error("Date {date} is outside the selectable range {start}..={end}")]
    OutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
