use chrono::NaiveDate;
use clap::Parser;
use lib::{
    DashboardConfig, DashboardLogger, DashboardReport, DateRange, NumericField, PipelineError,
    compare_days, day_report, mean_of, process_data, wind_report, write_csv, write_json,
    write_parquet, write_report,
};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: DashboardLogger = DashboardLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Semicolon-separated observation log
    #[arg(short, long, default_value = "Log.csv")]
    input_file: PathBuf,

    /// Output base name (will create dir containing the normalized table and the report)
    #[arg(short, long, default_value = "dashboard")]
    output: String,

    /// Date for the single-day and wind views (defaults to the first selectable date)
    #[arg(short, long)]
    day: Option<NaiveDate>,

    /// Dates to compare (e.g., 2023-05-31,2023-06-02). Defaults to every selectable date.
    #[arg(short, long, value_delimiter = ',')]
    compare: Vec<NaiveDate>,

    /// Field charted in the single-day and comparison views
    #[arg(short, long, default_value = "temperature")]
    field: NumericField,

    /// Fixed UTC offset, in hours, used to decode timestamps
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset: i32,

    /// First selectable date (inclusive)
    #[arg(long, default_value = "2023-05-31")]
    start_date: NaiveDate,

    /// Last selectable date (inclusive)
    #[arg(long, default_value = "2023-06-02")]
    end_date: NaiveDate,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), PipelineError> {
    let total_start = Instant::now();
    log::set_logger(&LOGGER)
        .map_err(|e| PipelineError::Data(format!("Logger already installed: {}", e)))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    let config = DashboardConfig {
        utc_offset_hours: args.utc_offset,
        range: DateRange {
            start: args.start_date,
            end: args.end_date,
        },
    };
    if config.range.start > config.range.end {
        return Err(PipelineError::Data(format!(
            "Start date {} is after end date {}",
            config.range.start, config.range.end
        )));
    }

    // Selections are validated up front so queries never see an unselectable date
    let day = config.range.check(args.day.unwrap_or(config.range.start))?;
    let compared = if args.compare.is_empty() {
        config.range.days()
    } else {
        args.compare
            .iter()
            .map(|date| config.range.check(*date))
            .collect::<Result<Vec<_>, _>>()?
    };

    println!("Weather Dashboard Pipeline");
    debug!(
        "Input file: {} | Range: {}..={} | UTC offset: {}h",
        args.input_file.display(),
        config.range.start,
        config.range.end,
        config.utc_offset_hours
    );
    debug!(
        "Day: {} | Compare: {} | Field: {}",
        day,
        compared
            .iter()
            .map(NaiveDate::to_string)
            .collect::<Vec<_>>()
            .join(","),
        args.field.column_name()
    );

    println!("Loading observation log...");
    let load_start = Instant::now();
    let table = process_data(&args.input_file, &config)?;
    let load_time = load_start.elapsed();
    println!(
        "Loaded {} observations over {} days in {:.2?}",
        table.len(),
        table.dates().len(),
        load_time
    );

    let query_start = Instant::now();
    let report = DashboardReport {
        day: day_report(&table, day, args.field),
        comparison: compare_days(&table, &compared, args.field),
        wind: wind_report(&table, day),
    };
    let query_time = query_start.elapsed();
    println!("Analytics completed in {:.2?}", query_time);

    // Create output directory
    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    println!(
        "Created output directory: {} | Writing output files...",
        output_dir.display()
    );
    let io_start = Instant::now();

    let output_name = args
        .output
        .split(['/', '\\'])
        .next_back()
        .unwrap_or(&args.output);
    let csv_path = output_dir.join(format!("{}.csv", output_name));
    let json_path = output_dir.join(format!("{}.json", output_name));
    let parquet_path = output_dir.join(format!("{}.parquet", output_name));
    let report_path = output_dir.join(format!("{}_report.json", output_name));

    write_csv(table.observations(), &csv_path)?;
    write_json(table.observations(), &json_path)?;
    write_parquet(table.observations(), &parquet_path)?;
    write_report(&report, &report_path)?;
    println!("All files took {:.2?}", io_start.elapsed());
    debug!("  - {}", csv_path.display());
    debug!("  - {}", json_path.display());
    debug!("  - {}", parquet_path.display());
    debug!("  - {}", report_path.display());

    // Annotations
    println!();
    match mean_of(table.filter_by_date(day), args.field) {
        Some(mean) => println!(
            "{} on {}: mean {:.2} {}",
            args.field.column_name(),
            day,
            mean,
            args.field.unit()
        ),
        None => println!("{} on {}: no data", args.field.column_name(), day),
    }
    match report.wind.prevailing {
        Some(point) => println!("On {} the wind mostly blew towards {}", day, point),
        None => println!("On {} there is no wind data", day),
    }
    match &report.comparison.daylight {
        Some(daylight) => println!(
            "Daylight changed by {} between {} and {}",
            daylight.difference, daylight.first.date, daylight.last.date
        ),
        None => println!("Daylight comparison unavailable: no data for the first or last date"),
    }

    println!("\nPipeline completed successfully in {:.2?}", total_start.elapsed());
    Ok(())
}
