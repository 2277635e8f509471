use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, NaiveTime};
use log::{Level, Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};

/// Console logger: warnings and errors go to stderr, everything else to stdout.
pub struct DashboardLogger;

impl Log for DashboardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => eprintln!("[{}] {}", record.level(), record.args()),
            _ => println!("[{}] {}", record.level(), record.args()),
        }
    }

    fn flush(&self) {}
}

/// One row of the semicolon-separated observation log, exactly as typed from the file.
///
/// Temperatures are in Kelvin and the three time columns are epoch seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "Datetime")]
    pub datetime: i64,
    #[serde(rename = "Weather")]
    pub weather_group: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Feels_Like")]
    pub feels_like: f64,
    #[serde(rename = "Temp_Min")]
    pub temp_min: f64,
    #[serde(rename = "Temp_Max")]
    pub temp_max: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    #[serde(rename = "Visibility")]
    pub visibility: f64,
    #[serde(rename = "Wind_Speed")]
    pub wind_speed: f64,
    #[serde(rename = "Wind_Gust")]
    pub wind_gust: f64,
    #[serde(rename = "Wind_Deg")]
    pub wind_deg: f64,
    #[serde(rename = "Clouds_Level")]
    pub clouds_level: f64,
    #[serde(rename = "Sunrise")]
    pub sunrise: i64,
    #[serde(rename = "Sunset")]
    pub sunset: i64,
}

/// Normalized weather observation. Temperatures are in Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub weather_group: String,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub visibility: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_deg: f64,
    pub clouds_level: f64,
    pub sunrise_time: NaiveTime,
    pub sunset_time: NaiveTime,
}

/// Numeric columns that can be averaged, projected or charted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum NumericField {
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "Feels_Like")]
    FeelsLike,
    #[serde(rename = "Temp_Min")]
    TempMin,
    #[serde(rename = "Temp_Max")]
    TempMax,
    #[serde(rename = "Pressure")]
    Pressure,
    #[serde(rename = "Humidity")]
    Humidity,
    #[serde(rename = "Visibility")]
    Visibility,
    #[serde(rename = "Wind_Speed")]
    WindSpeed,
    #[serde(rename = "Wind_Gust")]
    WindGust,
    #[serde(rename = "Wind_Deg")]
    WindDeg,
    #[serde(rename = "Clouds_Level")]
    CloudsLevel,
}

impl NumericField {
    /// Every numeric column, in log order.
    pub const ALL: [NumericField; 11] = [
        NumericField::Temperature,
        NumericField::FeelsLike,
        NumericField::TempMin,
        NumericField::TempMax,
        NumericField::Pressure,
        NumericField::Humidity,
        NumericField::Visibility,
        NumericField::WindSpeed,
        NumericField::WindGust,
        NumericField::WindDeg,
        NumericField::CloudsLevel,
    ];

    /// Fields shown in the daily mean table and the day comparison chart.
    pub const DAILY_SUMMARY: [NumericField; 7] = [
        NumericField::Temperature,
        NumericField::FeelsLike,
        NumericField::Pressure,
        NumericField::Humidity,
        NumericField::Visibility,
        NumericField::WindSpeed,
        NumericField::CloudsLevel,
    ];

    pub fn value(&self, observation: &Observation) -> f64 {
        match self {
            NumericField::Temperature => observation.temperature,
            NumericField::FeelsLike => observation.feels_like,
            NumericField::TempMin => observation.temp_min,
            NumericField::TempMax => observation.temp_max,
            NumericField::Pressure => observation.pressure,
            NumericField::Humidity => observation.humidity,
            NumericField::Visibility => observation.visibility,
            NumericField::WindSpeed => observation.wind_speed,
            NumericField::WindGust => observation.wind_gust,
            NumericField::WindDeg => observation.wind_deg,
            NumericField::CloudsLevel => observation.clouds_level,
        }
    }

    /// Header name of the column in the observation log.
    pub fn column_name(&self) -> &'static str {
        match self {
            NumericField::Temperature => "Temperature",
            NumericField::FeelsLike => "Feels_Like",
            NumericField::TempMin => "Temp_Min",
            NumericField::TempMax => "Temp_Max",
            NumericField::Pressure => "Pressure",
            NumericField::Humidity => "Humidity",
            NumericField::Visibility => "Visibility",
            NumericField::WindSpeed => "Wind_Speed",
            NumericField::WindGust => "Wind_Gust",
            NumericField::WindDeg => "Wind_Deg",
            NumericField::CloudsLevel => "Clouds_Level",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            NumericField::Temperature
            | NumericField::FeelsLike
            | NumericField::TempMin
            | NumericField::TempMax => "°C",
            NumericField::Pressure => "hPa",
            NumericField::Humidity | NumericField::CloudsLevel => "%",
            NumericField::Visibility => "m",
            NumericField::WindSpeed | NumericField::WindGust => "m/s",
            NumericField::WindDeg => "°",
        }
    }

    pub fn is_temperature(&self) -> bool {
        self.unit() == "°C"
    }
}

/// Categorical columns that can be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryField {
    #[serde(rename = "Weather")]
    Weather,
    #[serde(rename = "Description")]
    Description,
}

impl CategoryField {
    pub fn value<'a>(&self, observation: &'a Observation) -> &'a str {
        match self {
            CategoryField::Weather => &observation.weather_group,
            CategoryField::Description => &observation.description,
        }
    }
}

/// Closed interval of dates the user may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Returns the date unchanged if selectable, `OutOfRange` otherwise.
    pub fn check(&self, date: NaiveDate) -> Result<NaiveDate> {
        if self.contains(date) {
            Ok(date)
        } else {
            Err(PipelineError::OutOfRange {
                date,
                start: self.start,
                end: self.end,
            })
        }
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .collect()
    }
}

const FIRST_SELECTABLE_DAY: NaiveDate = match NaiveDate::from_ymd_opt(2023, 5, 31) {
    Some(date) => date,
    None => panic!("invalid first selectable day"),
};
const LAST_SELECTABLE_DAY: NaiveDate = match NaiveDate::from_ymd_opt(2023, 6, 2) {
    Some(date) => date,
    None => panic!("invalid last selectable day"),
};

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: FIRST_SELECTABLE_DAY,
            end: LAST_SELECTABLE_DAY,
        }
    }
}

/// Configuration for loading and querying the observation log
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Fixed offset from UTC, in hours, used to decode epoch timestamps
    pub utc_offset_hours: i32,
    pub range: DateRange,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            range: DateRange::default(),
        }
    }
}
