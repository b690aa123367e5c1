use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use serde_json::Value;

use almanac_core::config::Settings;
use almanac_rfc::rfc::recur::{ExpansionOptions, ExpansionWindow, expand, parse_rule};
use almanac_service::agenda::{StoredEvent, build_agenda};
use almanac_service::holiday::{DangiConverter, HolidayEngine, HolidayTable, LunarTable};

use crate::error::{AppError, AppResult};


#[derive(Debug, Parser)]
#[command(name = "almanac")]
#[command(about = "Recurring events and public holidays")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Public holidays for a year, or an inclusive range of years
    Holidays {
        year: i32,
        /// Last year of the range
        to_year: Option<i32>,
    },
    /// Occurrences of a recurrence rule inside a window
    Expand {
        /// Rule text, e.g. "FREQ=WEEKLY;BYDAY=MO,WE"
        rule: String,
        #[arg(value_parser = parse_instant)]
        dtstart: NaiveDateTime,
        #[arg(value_parser = parse_instant)]
        window_start: NaiveDateTime,
        #[arg(value_parser = parse_instant)]
        window_end: NaiveDateTime,
        /// Exclude an occurrence exactly at the window start
        #[arg(long)]
        exclusive: bool,
    },
    /// Events from a JSON file merged with holidays
    Agenda {
        /// JSON array of stored events
        events: PathBuf,
        #[arg(value_parser = parse_instant)]
        window_start: NaiveDateTime,
        #[arg(value_parser = parse_instant)]
        window_end: NaiveDateTime,
    },
}

/// ## Summary
/// Parses a command-line date-time.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, `YYYYMMDDTHHMMSS` and a bare
/// `YYYY-MM-DD`, which means midnight.
///
/// ## Errors
/// Returns a message naming the value when no form matches.
pub fn parse_instant(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y%m%dT%H%M%S"];

    let value = value.trim();
    if let Some(instant) = FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Ok(instant);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|e| format!("invalid date-time '{value}': {e}"))
}

/// ## Summary
/// Builds the holiday engine described by `settings`.
///
/// Uses the table at `holidays.table_path` when set, otherwise the built-in
/// South Korean table. Lunar festivals resolve through the Dangi calendar,
/// with `lunar_dates` overriding individual conversions.
///
/// ## Errors
/// Returns an error if the configured table cannot be loaded.
pub fn build_engine(settings: &Settings) -> AppResult<HolidayEngine<DangiConverter>> {
    let table = match &settings.holidays.table_path {
        Some(path) => HolidayTable::from_file(path)?,
        None => HolidayTable::korea(),
    };

    let overrides = LunarTable::from(settings.lunar_dates.as_slice());
    tracing::debug!(
        overrides = overrides.len(),
        "Lunar date overrides loaded"
    );
    let converter = DangiConverter::new().with_overrides(overrides);

    Ok(HolidayEngine::new(table, converter)
        .with_substitute_label(settings.holidays.substitute_label.clone()))
}

/// ## Summary
/// Runs one command and returns its JSON output.
///
/// ## Errors
/// Returns an error for an inverted year range, an unreadable or malformed
/// events file, or a holiday table that fails to load.
pub fn run(command: Command, settings: &Settings) -> AppResult<Value> {
    match command {
        Command::Holidays { year, to_year } => {
            let to_year = to_year.unwrap_or(year);
            if to_year < year {
                return Err(AppError::InvalidArgument(format!(
                    "year range {year}..={to_year} is empty"
                )));
            }

            let engine = build_engine(settings)?;
            let records = engine.compute_range(year..=to_year);
            tracing::info!(year, to_year, holidays = records.len(), "Holidays computed");
            Ok(serde_json::to_value(records)?)
        }
        Command::Expand {
            rule,
            dtstart,
            window_start,
            window_end,
            exclusive,
        } => {
            let mut window = ExpansionWindow::new(window_start, window_end);
            if exclusive {
                window = window.exclusive_start();
            }
            let options = ExpansionOptions::from(&settings.recurrence);

            let rule = parse_rule(&rule);
            let occurrences = expand(&rule, Some(dtstart), &window, &options);
            tracing::info!(%rule, occurrences = occurrences.len(), "Rule expanded");
            Ok(serde_json::to_value(occurrences)?)
        }
        Command::Agenda {
            events,
            window_start,
            window_end,
        } => {
            let events = read_events(&events)?;
            let window = ExpansionWindow::new(window_start, window_end);
            let options = ExpansionOptions::from(&settings.recurrence);
            let engine = build_engine(settings)?;

            let agenda = build_agenda(&events, &window, &engine, &options);
            Ok(serde_json::to_value(agenda)?)
        }
    }
}

fn read_events(path: &Path) -> AppResult<Vec<StoredEvent>> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
