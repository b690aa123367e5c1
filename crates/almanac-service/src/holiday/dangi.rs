//! Lunar conversion over the Korean traditional (Dangi) calendar.

use chrono::{Datelike, Days, NaiveDate};
use icu::calendar::Date;
use icu::calendar::cal::Dangi;

use super::lunar::{LunarConverter, LunarDate, LunarTable};

/// Days searched forward from the earliest solar date a lunar date can
/// fall on. A lunar year starts between 21 January and 20 February, so
/// every date lies within this span of its lower bound.
const SEARCH_DAYS: usize = 100;

/// Converter computing lunar dates from the Dangi calendar.
///
/// Dates present in the override table win over the computed ones.
#[derive(Debug, Clone, Default)]
pub struct DangiConverter {
    overrides: LunarTable,
}

impl DangiConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: LunarTable) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub const fn overrides(&self) -> &LunarTable {
        &self.overrides
    }

    fn compute(date: LunarDate) -> Option<NaiveDate> {
        if !(1..=12).contains(&date.month) || !(1..=30).contains(&date.day) {
            return None;
        }

        // New year is never before 21 January, months last at least 29 days.
        let offset = u64::from((date.month - 1) * 29 + date.day - 1);
        let earliest =
            NaiveDate::from_ymd_opt(date.year, 1, 21)?.checked_add_days(Days::new(offset))?;

        let code = month_code(date);
        earliest
            .iter_days()
            .take(SEARCH_DAYS)
            .find(|candidate| dangi_matches(*candidate, date, &code))
    }
}

impl LunarConverter for DangiConverter {
    fn solar_date_of(&self, date: LunarDate) -> Option<NaiveDate> {
        self.overrides.solar_date_of(date).or_else(|| {
            let solar = Self::compute(date);
            if solar.is_none() {
                tracing::debug!(?date, "Lunar date has no Dangi counterpart");
            }
            solar
        })
    }
}

/// Month code as the calendar reports it: `M04`, or `M04L` for a leap month.
fn month_code(lunar: LunarDate) -> String {
    let suffix = if lunar.leap { "L" } else { "" };
    format!("M{:02}{suffix}", lunar.month)
}

fn dangi_matches(solar: NaiveDate, lunar: LunarDate, code: &str) -> bool {
    let (Ok(month), Ok(day)) = (u8::try_from(solar.month()), u8::try_from(solar.day())) else {
        return false;
    };
    let Ok(iso) = Date::try_new_iso(solar.year(), month, day) else {
        return false;
    };

    let dangi = iso.to_calendar(Dangi::new());
    dangi.month().standard_code.0.as_str() == code
        && u32::from(dangi.day_of_month().0) == lunar.day
}
