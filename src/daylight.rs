use chrono::{NaiveTime, TimeDelta};

/// Time elapsed between sunrise and sunset on the same calendar day.
///
/// Sunset is expected to follow sunrise; if it doesn't the result is negative.
pub fn daylight_duration(sunrise: NaiveTime, sunset: NaiveTime) -> TimeDelta {
    sunset - sunrise
}

/// Absolute difference between two daylight durations.
pub fn daylight_difference(a: TimeDelta, b: TimeDelta) -> TimeDelta {
    (a - b).abs()
}

/// Renders a duration as `H:MM:SS`, truncated to whole seconds.
pub fn format_hms(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
