use crate::error::{PipelineError, Result};
use crate::query::ObservationTable;
use crate::structs::{DashboardConfig, Observation, RawObservation};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use log::{debug, warn};
use std::{fs::File, io::Read, path::Path};

const KELVIN_OFFSET: f64 = 273.15;
const LOG_DELIMITER: u8 = b';';

/// Loads the observation log at `file_path` and normalizes it into an immutable table.
///
/// This is the one-time batch load: the file is read completely, duplicates are
/// removed, rows are ordered chronologically, temperatures are converted to Celsius
/// and the epoch columns are decoded into calendar dates and times of day.
///
/// # Arguments
///
/// * `file_path` - Path to the semicolon-separated observation log
/// * `config` - Dashboard configuration; only the UTC offset is used here
///
/// # Errors
///
/// Returns `PipelineError` if:
/// - File cannot be opened or read
/// - A row is missing a column or holds a non-numeric value
/// - An epoch value cannot be represented as a calendar date
pub fn process_data(file_path: &Path, config: &DashboardConfig) -> Result<ObservationTable> {
    debug!("Reading observation log: {}", file_path.display());
    let raw = read_log(file_path)?;
    normalize(raw, config)
}

/// Reads and types every row of the observation log at `file_path`.
pub fn read_log(file_path: &Path) -> Result<Vec<RawObservation>> {
    let file = File::open(file_path)?;
    parse_log(file)
}

/// Reads and types every row of an observation log from any reader.
///
/// The first line must be the header. Columns are matched by name, so their
/// order is free and unknown columns are ignored. The first bad row aborts the load.
pub fn parse_log<R: Read>(reader: R) -> Result<Vec<RawObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(LOG_DELIMITER)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RawObservation = result?;
        rows.push(row);
    }
    debug!("Read {} raw rows", rows.len());
    Ok(rows)
}

/// Turns raw log rows into the normalized observation table.
///
/// Steps, in order:
/// 1. rows are ordered by their epoch timestamp (stable, so ties keep file order)
/// 2. rows identical in every field to an earlier row are dropped
/// 3. temperatures are converted from Kelvin to Celsius, rounded to 2 decimals
/// 4. `Datetime` is split into `date` and `time`, `Sunrise`/`Sunset` keep only their time of day
///
/// # Errors
///
/// Returns `PipelineError::InvalidTimestamp` for an epoch outside the calendar range,
/// and `PipelineError::Data` for a non-finite measurement or an invalid UTC offset.
pub fn normalize(raw: Vec<RawObservation>, config: &DashboardConfig) -> Result<ObservationTable> {
    let offset = config
        .utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            PipelineError::Data(format!(
                "UTC offset out of range: {} hours",
                config.utc_offset_hours
            ))
        })?;

    let total_rows = raw.len();
    // Line numbers are 1-based and the header takes line 1.
    let mut indexed: Vec<(usize, RawObservation)> = raw
        .into_iter()
        .enumerate()
        .map(|(i, row)| (i + 2, row))
        .collect();
    indexed.sort_by_key(|(_, row)| row.datetime);

    let kept = drop_exact_duplicates(indexed);
    debug!(
        "Dropped {} duplicate rows, {} rows remain",
        total_rows - kept.len(),
        kept.len()
    );

    let shared = kept
        .windows(2)
        .filter(|pair| pair[0].1.datetime == pair[1].1.datetime)
        .count();
    if shared > 0 {
        warn!(
            "{} rows share a timestamp with a different reading; keeping both",
            shared
        );
    }

    let observations = kept
        .into_iter()
        .map(|(line, row)| to_observation(line, row, &offset))
        .collect::<Result<Vec<_>>>()?;

    debug!("Normalized {} observations", observations.len());
    Ok(ObservationTable::new(observations))
}

/// Drops rows equal in every field to a row already kept.
///
/// Input must be ordered by timestamp; identical rows share a timestamp, so
/// each row is compared only against the kept rows of its own timestamp.
fn drop_exact_duplicates(sorted: Vec<(usize, RawObservation)>) -> Vec<(usize, RawObservation)> {
    let mut kept: Vec<(usize, RawObservation)> = Vec::with_capacity(sorted.len());
    let mut group_start = 0;

    for (line, row) in sorted {
        if kept
            .last()
            .is_some_and(|(_, last)| last.datetime != row.datetime)
        {
            group_start = kept.len();
        }
        if kept[group_start..].iter().any(|(_, seen)| *seen == row) {
            continue;
        }
        kept.push((line, row));
    }

    kept
}

fn to_observation(line: usize, row: RawObservation, offset: &FixedOffset) -> Result<Observation> {
    check_finite(line, &row)?;

    let datetime = decode_epoch(row.datetime, offset, line, "Datetime")?;
    let sunrise = decode_epoch(row.sunrise, offset, line, "Sunrise")?;
    let sunset = decode_epoch(row.sunset, offset, line, "Sunset")?;

    Ok(Observation {
        date: datetime.date(),
        time: datetime.time(),
        weather_group: row.weather_group,
        description: row.description,
        temperature: kelvin_to_celsius(row.temperature),
        feels_like: kelvin_to_celsius(row.feels_like),
        temp_min: kelvin_to_celsius(row.temp_min),
        temp_max: kelvin_to_celsius(row.temp_max),
        pressure: row.pressure,
        humidity: row.humidity,
        visibility: row.visibility,
        wind_speed: row.wind_speed,
        wind_gust: row.wind_gust,
        wind_deg: row.wind_deg,
        clouds_level: row.clouds_level,
        sunrise_time: sunrise.time(),
        sunset_time: sunset.time(),
    })
}

fn check_finite(line: usize, row: &RawObservation) -> Result<()> {
    let measurements = [
        ("Temperature", row.temperature),
        ("Feels_Like", row.feels_like),
        ("Temp_Min", row.temp_min),
        ("Temp_Max", row.temp_max),
        ("Pressure", row.pressure),
        ("Humidity", row.humidity),
        ("Visibility", row.visibility),
        ("Wind_Speed", row.wind_speed),
        ("Wind_Gust", row.wind_gust),
        ("Wind_Deg", row.wind_deg),
        ("Clouds_Level", row.clouds_level),
    ];

    match measurements.iter().find(|(_, value)| !value.is_finite()) {
        Some((column, value)) => Err(PipelineError::Data(format!(
            "Non-finite value in row {}, column {}: {}",
            line, column, value
        ))),
        None => Ok(()),
    }
}

/// Decodes epoch seconds into a local date and time at the given fixed offset.
fn decode_epoch(
    epoch: i64,
    offset: &FixedOffset,
    row: usize,
    column: &'static str,
) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(epoch, 0)
        .map(|utc| utc.with_timezone(offset).naive_local())
        .ok_or(PipelineError::InvalidTimestamp {
            row,
            column,
            value: epoch,
        })
}

/// Converts Kelvin to Celsius, rounded to 2 decimals.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    round_to(kelvin - KELVIN_OFFSET, 2)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const HEADER: &str = "Datetime;Weather;Description;Temperature;Feels_Like;Temp_Min;Temp_Max;Pressure;Humidity;Visibility;Wind_Speed;Wind_Gust;Wind_Deg;Clouds_Level;Sunrise;Sunset";

    // 2023-05-31 sunrise 03:29:00 UTC, sunset 18:24:40 UTC
    fn raw(datetime: i64, temperature: f64) -> RawObservation {
        RawObservation {
            datetime,
            weather_group: "Clear".to_string(),
            description: "clear sky".to_string(),
            temperature,
            feels_like: temperature,
            temp_min: temperature - 1.0,
            temp_max: temperature + 1.0,
            pressure: 1015.0,
            humidity: 60.0,
            visibility: 10000.0,
            wind_speed: 3.1,
            wind_gust: 4.2,
            wind_deg: 200.0,
            clouds_level: 0.0,
            sunrise: 1_685_503_740,
            sunset: 1_685_557_480,
        }
    }

    #[test]
    fn converts_kelvin_to_celsius() {
        assert_eq!(kelvin_to_celsius(293.15), 20.0);
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_eq!(kelvin_to_celsius(295.678), 22.53);
        assert_eq!(kelvin_to_celsius(250.0), -23.15);
    }

    #[test]
    fn celsius_converts_back_within_rounding() {
        for kelvin in [250.004, 273.15, 288.71, 301.999, 310.5] {
            let back = kelvin_to_celsius(kelvin) + KELVIN_OFFSET;
            assert!((back - kelvin).abs() <= 0.005 + 1e-9, "{kelvin} -> {back}");
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(197.54, 1), 197.5);
    }

    #[test]
    fn parses_semicolon_log_with_padding() {
        let log = format!(
            "{HEADER}\n1685527200; Clear ;clear sky;293.15;293.0;292.0;294.0;1015;60;10000;3.1;4.2;200;0;1685503740;1685557480\n"
        );
        let rows = parse_log(log.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].datetime, 1_685_527_200);
        assert_eq!(rows[0].weather_group, "Clear");
        assert_eq!(rows[0].temperature, 293.15);
    }

    #[test]
    fn rejects_non_numeric_epoch() {
        let log = format!(
            "{HEADER}\nyesterday;Clear;clear sky;293.15;293.0;292.0;294.0;1015;60;10000;3.1;4.2;200;0;1685503740;1685557480\n"
        );
        assert!(matches!(
            parse_log(log.as_bytes()),
            Err(PipelineError::Csv(_))
        ));
    }

    #[test]
    fn rejects_missing_column() {
        let log = "Datetime;Weather\n1685527200;Clear\n";
        assert!(parse_log(log.as_bytes()).is_err());
    }

    #[test]
    fn normalizes_a_row() {
        let table = normalize(vec![raw(1_685_527_200, 293.15)], &DashboardConfig::default()).unwrap();
        let obs = &table.observations()[0];
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 5, 31).unwrap());
        assert_eq!(obs.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(obs.temperature, 20.0);
        assert_eq!(obs.temp_min, 19.0);
        assert_eq!(obs.temp_max, 21.0);
        assert_eq!(obs.sunrise_time, NaiveTime::from_hms_opt(3, 29, 0).unwrap());
        assert_eq!(obs.sunset_time, NaiveTime::from_hms_opt(18, 24, 40).unwrap());
        assert_eq!(obs.time.format("%H:%M:%S").to_string(), "10:00:00");
    }

    #[test]
    fn applies_utc_offset() {
        let config = DashboardConfig {
            utc_offset_hours: 2,
            ..DashboardConfig::default()
        };
        // 2023-05-31 23:00:00 UTC
        let table = normalize(vec![raw(1_685_574_000, 293.15)], &config).unwrap();
        let obs = &table.observations()[0];
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(obs.time, NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(obs.sunrise_time, NaiveTime::from_hms_opt(5, 29, 0).unwrap());
    }

    #[test]
    fn drops_only_exact_duplicates_and_sorts() {
        let mut partial = raw(1_685_527_200, 293.15);
        partial.humidity = 61.0;
        let rows = vec![
            raw(1_685_530_800, 295.15),
            raw(1_685_527_200, 293.15),
            partial.clone(),
            raw(1_685_527_200, 293.15),
            raw(1_685_530_800, 295.15),
        ];
        let table = normalize(rows, &DashboardConfig::default()).unwrap();
        let obs = table.observations();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].humidity, 60.0);
        assert_eq!(obs[1].humidity, 61.0);
        assert_eq!(obs[2].temperature, 22.0);
    }

    #[test]
    fn dedup_is_idempotent() {
        let sorted = vec![
            (2, raw(1_685_527_200, 293.15)),
            (3, raw(1_685_527_200, 294.15)),
            (4, raw(1_685_527_200, 293.15)),
            (5, raw(1_685_530_800, 295.15)),
        ];
        let once = drop_exact_duplicates(sorted);
        assert_eq!(once.len(), 3);
        let twice = drop_exact_duplicates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_unrepresentable_epoch() {
        let mut bad = raw(1_685_527_200, 293.15);
        bad.sunset = i64::MAX;
        match normalize(vec![bad], &DashboardConfig::default()) {
            Err(PipelineError::InvalidTimestamp { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Sunset");
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_finite_measurement() {
        let mut bad = raw(1_685_527_200, 293.15);
        bad.pressure = f64::NAN;
        assert!(matches!(
            normalize(vec![bad], &DashboardConfig::default()),
            Err(PipelineError::Data(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_utc_offset() {
        for hours in [25, -25, 1_000_000, i32::MIN] {
            let config = DashboardConfig {
                utc_offset_hours: hours,
                ..DashboardConfig::default()
            };
            assert!(
                matches!(normalize(Vec::new(), &config), Err(PipelineError::Data(_))),
                "offset {hours} should be rejected"
            );
        }
    }
}
