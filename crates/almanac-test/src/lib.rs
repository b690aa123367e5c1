//! Almanac - integration test support.
//!
//! Fixtures shared by the integration tests.

pub mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use almanac_service::holiday::{HolidayEngine, HolidayTable, LunarDate, LunarTable};

    /// Solar dates of Seollal, Buddha's Birthday and Chuseok for 2024-2026.
    const KOREAN_LUNAR_DATES: [(i32, u32, u32, (i32, u32, u32)); 9] = [
        (2024, 1, 1, (2024, 2, 10)),
        (2024, 4, 8, (2024, 5, 15)),
        (2024, 8, 15, (2024, 9, 17)),
        (2025, 1, 1, (2025, 1, 29)),
        (2025, 4, 8, (2025, 5, 5)),
        (2025, 8, 15, (2025, 10, 6)),
        (2026, 1, 1, (2026, 2, 17)),
        (2026, 4, 8, (2026, 5, 24)),
        (2026, 8, 15, (2026, 9, 25)),
    ];

    /// ## Panics
    /// Panics if the date does not exist.
    #[must_use]
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| {
            panic!("invalid fixture date {year}-{month:02}-{day:02}")
        })
    }

    /// ## Panics
    /// Panics if the date-time does not exist.
    #[must_use]
    pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(year, month, day)
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| panic!("invalid fixture time {hour:02}:{minute:02}"))
    }

    /// Lunar converter that knows the Korean festival dates of 2024-2026.
    #[must_use]
    pub fn korean_lunar_table() -> LunarTable {
        KOREAN_LUNAR_DATES
            .iter()
            .map(|&(year, month, day, (sy, sm, sd))| {
                (LunarDate::new(year, month, day), date(sy, sm, sd))
            })
            .collect()
    }

    /// Engine over the built-in Korean table and [`korean_lunar_table`].
    #[must_use]
    pub fn korean_engine() -> HolidayEngine<LunarTable> {
        HolidayEngine::new(HolidayTable::korea(), korean_lunar_table())
    }
}
