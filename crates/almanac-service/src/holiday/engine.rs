use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use almanac_core::constants::DEFAULT_SUBSTITUTE_LABEL;

use super::lunar::{LunarConverter, LunarDate};
use super::record::{HolidayKind, HolidayRecord};
use super::table::{FestivalSpan, HolidayTable};

/// ## Summary
/// Computes the holiday calendar for a year from a table and a lunar converter.
///
/// Holds no mutable state: `compute` may be called from any number of threads
/// as long as the converter is thread-safe (which [`LunarConverter`] requires).
#[derive(Debug, Clone)]
pub struct HolidayEngine<C> {
    table: HolidayTable,
    converter: C,
    substitute_label: String,
}

impl<C: LunarConverter> HolidayEngine<C> {
    #[must_use]
    pub fn new(table: HolidayTable, converter: C) -> Self {
        Self {
            table,
            converter,
            substitute_label: DEFAULT_SUBSTITUTE_LABEL.to_string(),
        }
    }

    /// Sets the label used in substitute titles, `"<label> (<original>)"`.
    #[must_use]
    pub fn with_substitute_label(mut self, label: impl Into<String>) -> Self {
        self.substitute_label = label.into();
        self
    }

    #[must_use]
    pub const fn table(&self) -> &HolidayTable {
        &self.table
    }

    /// ## Summary
    /// Returns the holidays of `year`, sorted by date.
    ///
    /// Records on the same date keep pass order: fixed, lunar, substitute.
    /// Lunar festivals the converter cannot resolve are omitted.
    #[must_use]
    pub fn compute(&self, year: i32) -> Vec<HolidayRecord> {
        let mut records = self.fixed_holidays(year);
        records.extend(self.lunar_holidays(year));

        let substitutes = self.substitute_holidays(&records);
        records.extend(substitutes);

        records.sort_by_key(|record| record.date);

        tracing::debug!(year, holidays = records.len(), "Computed holidays");
        records
    }

    /// Holidays for each year in `years`, concatenated.
    #[must_use]
    pub fn compute_range(&self, years: RangeInclusive<i32>) -> Vec<HolidayRecord> {
        years.flat_map(|year| self.compute(year)).collect()
    }

    fn fixed_holidays(&self, year: i32) -> Vec<HolidayRecord> {
        self.table
            .fixed
            .iter()
            .filter_map(|holiday| {
                let Some(date) = NaiveDate::from_ymd_opt(year, holiday.month, holiday.day) else {
                    tracing::trace!(
                        year,
                        month = holiday.month,
                        day = holiday.day,
                        title = %holiday.title,
                        "Fixed holiday does not exist this year"
                    );
                    return None;
                };
                Some(HolidayRecord::new(
                    date,
                    holiday.title.clone(),
                    holiday.observed,
                    HolidayKind::Fixed,
                ))
            })
            .collect()
    }

    fn lunar_holidays(&self, year: i32) -> Vec<HolidayRecord> {
        let mut records = Vec::new();

        for festival in &self.table.lunar {
            let lunar = LunarDate {
                year,
                month: festival.month,
                day: festival.day,
                leap: festival.leap,
            };
            let Some(date) = self.converter.solar_date_of(lunar) else {
                tracing::warn!(
                    year,
                    month = festival.month,
                    day = festival.day,
                    title = %festival.title,
                    "Lunar date could not be resolved, festival omitted"
                );
                continue;
            };

            let days = match festival.span {
                FestivalSpan::Single => vec![Some(date)],
                FestivalSpan::ThreeDay => vec![
                    date.checked_sub_days(Days::new(1)),
                    Some(date),
                    date.checked_add_days(Days::new(1)),
                ],
            };

            records.extend(days.into_iter().flatten().map(|day| {
                HolidayRecord::new(day, festival.title.clone(), true, HolidayKind::Lunar)
            }));
        }

        records
    }

    /// Substitutes for observed weekend holidays: Saturday moves two days
    /// forward, Sunday one. Substitutes are never themselves shifted.
    fn substitute_holidays(&self, records: &[HolidayRecord]) -> Vec<HolidayRecord> {
        let excluded: HashSet<&str> = self.table.multi_day_titles().collect();

        records
            .iter()
            .filter(|record| record.is_observed && !excluded.contains(record.title.as_str()))
            .filter_map(|record| {
                let shift = match record.date.weekday() {
                    Weekday::Sat => 2,
                    Weekday::Sun => 1,
                    _ => return None,
                };
                let date = record.date.checked_add_days(Days::new(shift))?;
                Some(HolidayRecord::new(
                    date,
                    format!("{} ({})", self.substitute_label, record.title),
                    true,
                    HolidayKind::Substitute,
                ))
            })
            .collect()
    }
}
