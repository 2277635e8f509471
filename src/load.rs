use crate::analytics::DashboardReport;
use crate::error::Result;
use crate::structs::{NumericField, Observation};
use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use csv::Writer;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Writes the normalized observations to a CSV file.
///
/// Dates are written as `YYYY-MM-DD` and times of day as `HH:MM:SS`.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(observations: &[Observation], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "Date",
        "Time",
        "Weather",
        "Description",
        "Temperature",
        "Feels_Like",
        "Temp_Min",
        "Temp_Max",
        "Pressure",
        "Humidity",
        "Visibility",
        "Wind_Speed",
        "Wind_Gust",
        "Wind_Deg",
        "Clouds_Level",
        "Sunrise_Time",
        "Sunset_Time",
    ])?;

    for obs in observations {
        writer.write_record(&[
            obs.date.format(DATE_FORMAT).to_string(),
            obs.time.format(TIME_FORMAT).to_string(),
            obs.weather_group.clone(),
            obs.description.clone(),
            format!("{:.2}", obs.temperature),
            format!("{:.2}", obs.feels_like),
            format!("{:.2}", obs.temp_min),
            format!("{:.2}", obs.temp_max),
            obs.pressure.to_string(),
            obs.humidity.to_string(),
            obs.visibility.to_string(),
            obs.wind_speed.to_string(),
            obs.wind_gust.to_string(),
            obs.wind_deg.to_string(),
            obs.clouds_level.to_string(),
            obs.sunrise_time.format(TIME_FORMAT).to_string(),
            obs.sunset_time.format(TIME_FORMAT).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the normalized observations to a pretty-formatted JSON file.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json(observations: &[Observation], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, observations)?;
    Ok(())
}

/// Writes the dashboard report (day detail, comparison, wind) to a pretty-formatted JSON file.
pub fn write_report(report: &DashboardReport, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Writes the normalized observations to a columnar Parquet file using Arrow format.
///
/// Date and time columns are stored as strings in the same formats as the CSV export.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_parquet(observations: &[Observation], output_path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("time", DataType::Utf8, false),
        Field::new("weather", DataType::Utf8, false),
        Field::new("description", DataType::Utf8, false),
    ];
    for field in NumericField::ALL {
        fields.push(Field::new(
            field.column_name().to_lowercase(),
            DataType::Float64,
            false,
        ));
    }
    fields.push(Field::new("sunrise_time", DataType::Utf8, false));
    fields.push(Field::new("sunset_time", DataType::Utf8, false));
    let schema = Arc::new(Schema::new(fields));

    let dates = StringArray::from_iter_values(
        observations
            .iter()
            .map(|o| o.date.format(DATE_FORMAT).to_string()),
    );
    let times = StringArray::from_iter_values(
        observations
            .iter()
            .map(|o| o.time.format(TIME_FORMAT).to_string()),
    );
    let weather =
        StringArray::from_iter_values(observations.iter().map(|o| o.weather_group.as_str()));
    let descriptions =
        StringArray::from_iter_values(observations.iter().map(|o| o.description.as_str()));
    let sunrises = StringArray::from_iter_values(
        observations
            .iter()
            .map(|o| o.sunrise_time.format(TIME_FORMAT).to_string()),
    );
    let sunsets = StringArray::from_iter_values(
        observations
            .iter()
            .map(|o| o.sunset_time.format(TIME_FORMAT).to_string()),
    );

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(dates),
        Arc::new(times),
        Arc::new(weather),
        Arc::new(descriptions),
    ];
    for field in NumericField::ALL {
        let column: Float64Array = observations.iter().map(|o| field.value(o)).collect();
        columns.push(Arc::new(column));
    }
    columns.push(Arc::new(sunrises));
    columns.push(Arc::new(sunsets));

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
