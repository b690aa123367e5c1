//! Holiday tables.
//!
//! A table is plain data handed to the engine. The built-in table is South
//! Korea's; other jurisdictions are supplied as a TOML file of the same shape.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// A holiday on a fixed solar month/day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHoliday {
    pub month: u32,
    pub day: u32,
    pub title: String,
    /// Statutory non-working day.
    #[serde(default = "observed_by_default")]
    pub observed: bool,
}

/// How many solar days a lunar festival covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FestivalSpan {
    /// Only the converted day.
    #[default]
    Single,
    /// The day before, the converted day and the day after.
    ThreeDay,
}

/// A festival on a fixed lunar month/day. Always observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarFestival {
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub leap: bool,
    pub title: String,
    #[serde(default)]
    pub span: FestivalSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTable {
    #[serde(default)]
    pub fixed: Vec<FixedHoliday>,
    #[serde(default)]
    pub lunar: Vec<LunarFestival>,
}

const fn observed_by_default() -> bool {
    true
}

fn fixed(month: u32, day: u32, title: &str, observed: bool) -> FixedHoliday {
    FixedHoliday {
        month,
        day,
        title: title.to_string(),
        observed,
    }
}

fn festival(month: u32, day: u32, title: &str, span: FestivalSpan) -> LunarFestival {
    LunarFestival {
        month,
        day,
        leap: false,
        title: title.to_string(),
        span,
    }
}

impl Default for HolidayTable {
    fn default() -> Self {
        Self::korea()
    }
}

impl HolidayTable {
    /// ## Summary
    /// South Korean public holidays.
    ///
    /// Constitution Day is listed but has not been a non-working day since 2008.
    #[must_use]
    pub fn korea() -> Self {
        Self {
            fixed: vec![
                fixed(1, 1, "New Year's Day", true),
                fixed(3, 1, "Independence Movement Day", true),
                fixed(5, 5, "Children's Day", true),
                fixed(6, 6, "Memorial Day", true),
                fixed(7, 17, "Constitution Day", false),
                fixed(8, 15, "Liberation Day", true),
                fixed(10, 3, "National Foundation Day", true),
                fixed(10, 9, "Hangul Day", true),
                fixed(12, 25, "Christmas Day", true),
            ],
            lunar: vec![
                festival(1, 1, "Seollal", FestivalSpan::ThreeDay),
                festival(4, 8, "Buddha's Birthday", FestivalSpan::Single),
                festival(8, 15, "Chuseok", FestivalSpan::ThreeDay),
            ],
        }
    }

    /// ## Summary
    /// Loads a table from a TOML, JSON or YAML file (by extension).
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or parsed, or if an entry
    /// fails [`validate`](Self::validate).
    pub fn from_file(path: &Path) -> ServiceResult<Self> {
        let table = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<Self>()?;

        table.validate()?;
        tracing::debug!(
            path = %path.display(),
            fixed = table.fixed.len(),
            lunar = table.lunar.len(),
            "Loaded holiday table"
        );
        Ok(table)
    }

    /// ## Summary
    /// Checks month/day ranges and titles.
    ///
    /// Day-of-month is only range-checked here; whether a fixed day exists in a
    /// particular year (Feb 29) is decided per year by the engine.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` naming the first offending entry.
    pub fn validate(&self) -> ServiceResult<()> {
        for holiday in &self.fixed {
            if !(1..=12).contains(&holiday.month) || !(1..=31).contains(&holiday.day) {
                return Err(ServiceError::InvalidConfiguration(format!(
                    "fixed holiday '{}' has invalid date {:02}-{:02}",
                    holiday.title, holiday.month, holiday.day
                )));
            }
            if holiday.title.trim().is_empty() {
                return Err(ServiceError::InvalidConfiguration(
                    "fixed holiday with empty title".to_string(),
                ));
            }
        }

        for festival in &self.lunar {
            if !(1..=12).contains(&festival.month) || !(1..=30).contains(&festival.day) {
                return Err(ServiceError::InvalidConfiguration(format!(
                    "lunar festival '{}' has invalid lunar date {}/{}",
                    festival.title, festival.month, festival.day
                )));
            }
            if festival.title.trim().is_empty() {
                return Err(ServiceError::InvalidConfiguration(
                    "lunar festival with empty title".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Titles of multi-day festivals, which never produce substitutes.
    pub(super) fn multi_day_titles(&self) -> impl Iterator<Item = &str> {
        self.lunar
            .iter()
            .filter(|festival| festival.span == FestivalSpan::ThreeDay)
            .map(|festival| festival.title.as_str())
    }
}
