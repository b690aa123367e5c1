use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a holiday record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    Fixed,
    Lunar,
    Substitute,
}

/// One holiday on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub title: String,
    /// Statutory non-working day.
    pub is_observed: bool,
    pub kind: HolidayKind,
}

impl HolidayRecord {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        is_observed: bool,
        kind: HolidayKind,
    ) -> Self {
        Self {
            date,
            title: title.into(),
            is_observed,
            kind,
        }
    }
}
