use crate::structs::{CategoryField, NumericField, Observation};
use crate::transform::round_to;
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// The normalized observation log, ordered chronologically.
///
/// Only the normalizer builds a table; afterwards it is read-only and every
/// query borrows from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    observations: Vec<Observation>,
}

impl ObservationTable {
    pub(crate) fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct dates present in the table, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.observations.iter().map(|o| o.date).collect();
        dates.dedup();
        dates
    }

    /// All observations taken on `date`, in chronological order.
    ///
    /// Rows are sorted by timestamp, so one date is a contiguous run and the
    /// bounds are found by binary search. An unmatched date yields an empty slice.
    pub fn filter_by_date(&self, date: NaiveDate) -> &[Observation] {
        let start = self.observations.partition_point(|o| o.date < date);
        let end = self.observations.partition_point(|o| o.date <= date);
        &self.observations[start..end]
    }
}

/// Mean of `field` over `subset`, rounded to 2 decimals.
///
/// Returns `None` for an empty subset; zero is a valid reading and must not
/// stand in for "no data".
pub fn mean_of(subset: &[Observation], field: NumericField) -> Option<f64> {
    raw_mean(subset, field).map(|mean| round_to(mean, 2))
}

pub(crate) fn raw_mean(subset: &[Observation], field: NumericField) -> Option<f64> {
    if subset.is_empty() {
        return None;
    }
    let sum: f64 = subset.iter().map(|o| field.value(o)).sum();
    Some(sum / subset.len() as f64)
}

/// Smallest and largest value of `field` over `subset`.
pub fn min_max_of(subset: &[Observation], field: NumericField) -> Option<(f64, f64)> {
    subset.iter().map(|o| field.value(o)).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Number of observations per distinct value of `field`.
pub fn count_by_category(subset: &[Observation], field: CategoryField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for observation in subset {
        *counts
            .entry(field.value(observation).to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// Projects `field` in the subset's chronological order.
pub fn select_field(subset: &[Observation], field: NumericField) -> Vec<f64> {
    subset.iter().map(|o| field.value(o)).collect()
}

/// Projects `field` paired with the time of day of each observation.
pub fn time_series(subset: &[Observation], field: NumericField) -> Vec<(NaiveTime, f64)> {
    subset.iter().map(|o| (o.time, field.value(o))).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn observation(date: NaiveDate, hour: u32, temperature: f64) -> Observation {
        Observation {
            date,
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            weather_group: "Clear".to_string(),
            description: "clear sky".to_string(),
            temperature,
            feels_like: temperature - 0.5,
            temp_min: temperature - 1.0,
            temp_max: temperature + 1.0,
            pressure: 1012.0,
            humidity: 55.0,
            visibility: 10000.0,
            wind_speed: 2.5,
            wind_gust: 3.5,
            wind_deg: 90.0 + hour as f64,
            clouds_level: 20.0,
            sunrise_time: NaiveTime::from_hms_opt(5, 27, 12).unwrap(),
            sunset_time: NaiveTime::from_hms_opt(20, 23, 45).unwrap(),
        }
    }

    pub(crate) fn may_31() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 31).unwrap()
    }

    pub(crate) fn june_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn table() -> ObservationTable {
        ObservationTable::new(vec![
            observation(may_31(), 8, 20.0),
            observation(may_31(), 12, 22.0),
            observation(may_31(), 16, 24.0),
            observation(june_1(), 9, 18.5),
        ])
    }

    #[test]
    fn filters_one_day() {
        let table = table();
        assert_eq!(table.filter_by_date(may_31()).len(), 3);
        assert_eq!(table.filter_by_date(june_1()).len(), 1);
        assert_eq!(table.dates(), vec![may_31(), june_1()]);
    }

    #[test]
    fn unmatched_date_is_empty_not_error() {
        let table = table();
        let missing = NaiveDate::from_ymd_opt(2023, 6, 2).unwrap();
        assert!(table.filter_by_date(missing).is_empty());
        assert_eq!(mean_of(table.filter_by_date(missing), NumericField::Temperature), None);
    }

    #[test]
    fn mean_of_three_readings() {
        let table = table();
        let day = table.filter_by_date(may_31());
        assert_eq!(mean_of(day, NumericField::Temperature), Some(22.0));
        assert_eq!(mean_of(day, NumericField::WindDeg), Some(102.0));
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        let day = vec![
            observation(may_31(), 1, 20.0),
            observation(may_31(), 2, 20.0),
            observation(may_31(), 3, 21.0),
        ];
        assert_eq!(mean_of(&day, NumericField::Temperature), Some(20.33));
    }

    #[test]
    fn counts_descriptions() {
        let mut day = vec![
            observation(may_31(), 1, 20.0),
            observation(may_31(), 2, 20.0),
            observation(may_31(), 3, 21.0),
        ];
        day[1].description = "light rain".to_string();
        day[1].weather_group = "Rain".to_string();

        let counts = count_by_category(&day, CategoryField::Description);
        assert_eq!(counts.get("clear sky"), Some(&2));
        assert_eq!(counts.get("light rain"), Some(&1));
        assert_eq!(count_by_category(&day, CategoryField::Weather).len(), 2);
        assert!(count_by_category(&[], CategoryField::Weather).is_empty());
    }

    #[test]
    fn projects_in_time_order() {
        let table = table();
        let day = table.filter_by_date(may_31());
        assert_eq!(
            select_field(day, NumericField::TempMax),
            vec![21.0, 23.0, 25.0]
        );
        let series = time_series(day, NumericField::WindDeg);
        assert_eq!(series[0], (NaiveTime::from_hms_opt(8, 0, 0).unwrap(), 98.0));
        assert!(series.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn min_max_band() {
        let table = table();
        let day = table.filter_by_date(may_31());
        assert_eq!(min_max_of(day, NumericField::Temperature), Some((20.0, 24.0)));
        assert_eq!(min_max_of(&[], NumericField::Temperature), None);
    }
}
