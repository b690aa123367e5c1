//! Public-holiday calendar computation.
//!
//! A year's holidays come from three passes: fixed solar dates from the
//! table, lunar festivals resolved through a [`LunarConverter`], and
//! substitute days for observed holidays that land on a weekend.

mod dangi;
mod engine;
mod lunar;
mod record;
mod table;

pub use dangi::DangiConverter;
pub use engine::HolidayEngine;
pub use lunar::{LunarConverter, LunarDate, LunarTable};
pub use record::{HolidayKind, HolidayRecord};
pub use table::{FestivalSpan, FixedHoliday, HolidayTable, LunarFestival};
