pub mod analytics;
pub mod cardinal;
pub mod daylight;
pub mod error;
pub mod load;
pub mod query;
pub mod structs;
pub mod transform;

// Re-export public API
pub use analytics::{DashboardReport, compare_days, day_report, wind_report};
pub use cardinal::{CardinalPoint, nearest_cardinal};
pub use daylight::{daylight_difference, daylight_duration, format_hms};
pub use error::{PipelineError, Result};
pub use load::{write_csv, write_json, write_parquet, write_report};
pub use query::{
    ObservationTable, count_by_category, mean_of, min_max_of, select_field, time_series,
};
pub use structs::{
    CategoryField, DashboardConfig, DashboardLogger, DateRange, NumericField, Observation,
    RawObservation,
};
pub use transform::{kelvin_to_celsius, normalize, parse_log, process_data, read_log, round_to};
