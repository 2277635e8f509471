use crate::cardinal::{CardinalPoint, nearest_cardinal};
use crate::daylight::{daylight_difference, daylight_duration, format_hms};
use crate::query::{
    ObservationTable, count_by_category, mean_of, min_max_of, raw_mean, time_series,
};
use crate::structs::{CategoryField, NumericField, Observation};
use crate::transform::round_to;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// A value of one field at one time of day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: NaiveTime,
    pub value: f64,
}

/// Temperature band drawn around a temperature series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureBand {
    pub temp_min: Vec<SeriesPoint>,
    pub temp_max: Vec<SeriesPoint>,
    /// Lowest `Temp_Min` and highest `Temp_Max` of the day
    pub extremes: Option<(f64, f64)>,
}

/// Daily means of the dashboard fields for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub observations: usize,
    /// `None` marks a field with no data for the date
    pub means: BTreeMap<NumericField, Option<f64>>,
}

/// Single-day detail: a time series of one field plus the daily mean table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub field: NumericField,
    pub unit: &'static str,
    pub series: Vec<SeriesPoint>,
    pub band: Option<TemperatureBand>,
    pub summary: DaySummary,
}

/// Weather descriptions observed on one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBreakdown {
    pub date: NaiveDate,
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaylightDay {
    pub date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub daylight: String,
}

/// Daylight of the first and last compared dates and how much it changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaylightComparison {
    pub first: DaylightDay,
    pub last: DaylightDay,
    pub difference: String,
}

/// Multi-day comparison of daily means, conditions and daylight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub field: NumericField,
    pub unit: &'static str,
    /// Daily mean of the selected field, one entry per compared date
    pub field_means: Vec<(NaiveDate, Option<f64>)>,
    pub days: Vec<DaySummary>,
    pub conditions: Vec<ConditionBreakdown>,
    pub daylight: Option<DaylightComparison>,
}

/// Wind direction analysis for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindReport {
    pub date: NaiveDate,
    pub series: Vec<SeriesPoint>,
    /// Mean bearing in degrees, rounded to 1 decimal
    pub mean_degrees: Option<f64>,
    pub prevailing: Option<CardinalPoint>,
}

/// Everything the dashboard shows for a selection, in one serializable value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub day: DayReport,
    pub comparison: ComparisonReport,
    pub wind: WindReport,
}

fn to_series(subset: &[Observation], field: NumericField) -> Vec<SeriesPoint> {
    time_series(subset, field)
        .into_iter()
        .map(|(time, value)| SeriesPoint { time, value })
        .collect()
}

/// Daily means of [`NumericField::DAILY_SUMMARY`] for `date`.
pub fn summarize_day(table: &ObservationTable, date: NaiveDate) -> DaySummary {
    let subset = table.filter_by_date(date);
    let means = NumericField::DAILY_SUMMARY
        .iter()
        .map(|field| (*field, mean_of(subset, *field)))
        .collect();

    DaySummary {
        date,
        observations: subset.len(),
        means,
    }
}

/// Builds the single-day view for `date` and the selected `field`.
///
/// Temperature fields also carry the min/max band.
pub fn day_report(table: &ObservationTable, date: NaiveDate, field: NumericField) -> DayReport {
    let subset = table.filter_by_date(date);
    debug!("Day report for {}: {} observations", date, subset.len());

    let band = field.is_temperature().then(|| {
        let extremes = min_max_of(subset, NumericField::TempMin)
            .zip(min_max_of(subset, NumericField::TempMax))
            .map(|((lowest, _), (_, highest))| (lowest, highest));
        TemperatureBand {
            temp_min: to_series(subset, NumericField::TempMin),
            temp_max: to_series(subset, NumericField::TempMax),
            extremes,
        }
    });

    DayReport {
        field,
        unit: field.unit(),
        series: to_series(subset, field),
        band,
        summary: summarize_day(table, date),
    }
}

fn daylight_day(date: NaiveDate, observation: &Observation) -> DaylightDay {
    DaylightDay {
        date,
        sunrise: observation.sunrise_time,
        sunset: observation.sunset_time,
        daylight: format_hms(daylight_duration(
            observation.sunrise_time,
            observation.sunset_time,
        )),
    }
}

/// Sunrise, sunset and daylight of `date`, read from its first observation.
pub fn daylight_of(table: &ObservationTable, date: NaiveDate) -> Option<DaylightDay> {
    table
        .filter_by_date(date)
        .first()
        .map(|observation| daylight_day(date, observation))
}

/// Compares daylight between two dates.
///
/// Returns `None` when either date has no observations.
pub fn compare_daylight(
    table: &ObservationTable,
    first: NaiveDate,
    last: NaiveDate,
) -> Option<DaylightComparison> {
    let first = daylight_of(table, first)?;
    let last = daylight_of(table, last)?;
    let difference = daylight_difference(
        daylight_duration(first.sunrise, first.sunset),
        daylight_duration(last.sunrise, last.sunset),
    );

    Some(DaylightComparison {
        first,
        last,
        difference: format_hms(difference),
    })
}

/// Builds the multi-day comparison for `dates` and the selected `field`.
///
/// Daylight is compared between the first and last of `dates`.
pub fn compare_days(
    table: &ObservationTable,
    dates: &[NaiveDate],
    field: NumericField,
) -> ComparisonReport {
    debug!("Comparing {} days on {}", dates.len(), field.column_name());

    let field_means = dates
        .iter()
        .map(|date| (*date, mean_of(table.filter_by_date(*date), field)))
        .collect();
    let days = dates.iter().map(|date| summarize_day(table, *date)).collect();
    let conditions = dates
        .iter()
        .map(|date| ConditionBreakdown {
            date: *date,
            counts: count_by_category(table.filter_by_date(*date), CategoryField::Description),
        })
        .collect();
    let daylight = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => compare_daylight(table, *first, *last),
        _ => None,
    };

    ComparisonReport {
        field,
        unit: field.unit(),
        field_means,
        days,
        conditions,
        daylight,
    }
}

/// Builds the wind view for `date`.
///
/// The prevailing direction is the compass point nearest the mean bearing
/// (rounded to 1 decimal first), matching what the dashboard annotates.
pub fn wind_report(table: &ObservationTable, date: NaiveDate) -> WindReport {
    let subset = table.filter_by_date(date);
    let mean_degrees = raw_mean(subset, NumericField::WindDeg).map(|mean| round_to(mean, 1));

    WindReport {
        date,
        series: to_series(subset, NumericField::WindDeg),
        mean_degrees,
        prevailing: mean_degrees.map(nearest_cardinal),
    }
}
