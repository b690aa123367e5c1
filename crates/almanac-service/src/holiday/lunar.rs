//! Lunar to solar date conversion seam.
//!
//! Callers inject a [`LunarConverter`]: a closure, the Dangi calendar adapter
//! in [`super::DangiConverter`], or the [`LunarTable`] of known dates loaded
//! from configuration.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use almanac_core::config::LunarDateEntry;

/// A date on the lunar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Whether `month` is the intercalary (leap) month of `year`.
    #[serde(default)]
    pub leap: bool,
}

impl LunarDate {
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            leap: false,
        }
    }

    #[must_use]
    pub const fn leap(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            leap: true,
        }
    }
}

/// Resolves lunar dates to solar (Gregorian) dates.
///
/// Implementations must be pure: the same input always yields the same
/// output. `None` means the date cannot be resolved; the caller omits
/// whatever depended on it.
pub trait LunarConverter: Send + Sync {
    fn solar_date_of(&self, date: LunarDate) -> Option<NaiveDate>;
}

impl<F> LunarConverter for F
where
    F: Fn(LunarDate) -> Option<NaiveDate> + Send + Sync,
{
    fn solar_date_of(&self, date: LunarDate) -> Option<NaiveDate> {
        self(date)
    }
}

/// Converter backed by an explicit list of known conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LunarTable {
    dates: HashMap<LunarDate, NaiveDate>,
}

impl LunarTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a known conversion.
    #[must_use]
    pub fn with_date(mut self, lunar: LunarDate, solar: NaiveDate) -> Self {
        self.dates.insert(lunar, solar);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<(LunarDate, NaiveDate)> for LunarTable {
    fn from_iter<I: IntoIterator<Item = (LunarDate, NaiveDate)>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl From<&[LunarDateEntry]> for LunarTable {
    fn from(entries: &[LunarDateEntry]) -> Self {
        entries
            .iter()
            .map(|entry| {
                let lunar = LunarDate {
                    year: entry.lunar.year,
                    month: entry.lunar.month,
                    day: entry.lunar.day,
                    leap: entry.lunar.leap,
                };
                (lunar, entry.solar)
            })
            .collect()
    }
}

impl LunarConverter for LunarTable {
    fn solar_date_of(&self, date: LunarDate) -> Option<NaiveDate> {
        self.dates.get(&date).copied()
    }
}
