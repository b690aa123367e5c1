//! Recurrence rule value type (RFC 5545 §3.3.10 subset).

use std::fmt;
use std::num::NonZeroU32;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{RfcError, RfcResult};

/// Format used when writing `UNTIL` back to rule text.
pub(super) const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "SU")]
    Sunday,
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Days since Sunday (Sunday = 0).
    #[must_use]
    pub const fn num_days_from_sunday(self) -> u32 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Days from `start` forward to `self`, in `0..7`.
    #[must_use]
    pub const fn days_since(self, start: Self) -> u32 {
        (self.num_days_from_sunday() + 7 - start.num_days_from_sunday()) % 7
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl From<almanac_core::config::WeekStart> for Weekday {
    fn from(start: almanac_core::config::WeekStart) -> Self {
        match start {
            almanac_core::config::WeekStart::Sunday => Self::Sunday,
            almanac_core::config::WeekStart::Monday => Self::Monday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence rule, as stored alongside an event.
///
/// `DTSTART` is not part of the rule: it lives on the event and is passed to
/// [`expand`](super::expand) separately. A rule without a frequency describes
/// a single, non-recurring instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Recurrence frequency. `None` for degenerate rules.
    pub frequency: Option<Frequency>,

    /// Number of frequency units between iterations.
    pub interval: NonZeroU32,

    /// Inclusive upper bound on occurrences.
    pub until: Option<NaiveDateTime>,

    /// Total number of occurrences counted from `DTSTART`.
    pub count: Option<NonZeroU32>,

    /// Weekdays expanded within each week (weekly rules only).
    pub by_day: Vec<Weekday>,

    /// Days of the month expanded within each month (monthly rules only).
    /// Negative values count back from the end of the month.
    pub by_month_day: Vec<i8>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: None,
            interval: NonZeroU32::MIN,
            until: None,
            count: None,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
        }
    }
}

impl RecurrenceRule {
    /// Creates a new rule without a frequency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule with the given frequency.
    #[must_use]
    pub fn with_frequency(frequency: Frequency) -> Self {
        Self {
            frequency: Some(frequency),
            ..Self::default()
        }
    }

    /// Creates a daily recurrence rule.
    #[must_use]
    pub fn daily() -> Self {
        Self::with_frequency(Frequency::Daily)
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub fn weekly() -> Self {
        Self::with_frequency(Frequency::Weekly)
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub fn monthly() -> Self {
        Self::with_frequency(Frequency::Monthly)
    }

    /// Creates a yearly recurrence rule.
    #[must_use]
    pub fn yearly() -> Self {
        Self::with_frequency(Frequency::Yearly)
    }

    /// Parses rule text. See [`parse_rule`](super::parse_rule).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        super::parse_rule(text)
    }

    /// Sets the interval.
    ///
    /// ## Errors
    /// Returns `InvalidInterval` if `interval` is zero.
    pub fn with_interval(mut self, interval: u32) -> RfcResult<Self> {
        self.interval = NonZeroU32::new(interval).ok_or(RfcError::InvalidInterval)?;
        Ok(self)
    }

    /// Sets the count. Clears `until`.
    ///
    /// ## Errors
    /// Returns `InvalidCount` if `count` is zero.
    pub fn with_count(mut self, count: u32) -> RfcResult<Self> {
        self.count = Some(NonZeroU32::new(count).ok_or(RfcError::InvalidCount)?);
        self.until = None;
        Ok(self)
    }

    /// Sets the inclusive end. Clears `count`.
    #[must_use]
    pub fn with_until(mut self, until: NaiveDateTime) -> Self {
        self.until = Some(until);
        self.count = None;
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<Weekday>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-monthday list.
    ///
    /// ## Errors
    /// Returns `InvalidMonthDay` for zero or values outside `-31..=31`.
    pub fn with_by_month_day(mut self, days: Vec<i8>) -> RfcResult<Self> {
        if let Some(&bad) = days.iter().find(|&&d| !is_valid_month_day(d)) {
            return Err(RfcError::InvalidMonthDay(bad));
        }
        self.by_month_day = days;
        Ok(self)
    }

    /// Returns `true` if the rule describes a repeating schedule.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.frequency.is_some()
    }
}

pub(super) fn is_valid_month_day(day: i8) -> bool {
    day != 0 && (-31..=31).contains(&day)
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(freq) = self.frequency {
            parts.push(format!("FREQ={freq}"));
        }

        if self.interval.get() != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format(UNTIL_FORMAT)));
        }

        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }

        if !self.by_day.is_empty() {
            let s: Vec<_> = self.by_day.iter().map(ToString::to_string).collect();
            parts.push(format!("BYDAY={}", s.join(",")));
        }

        if !self.by_month_day.is_empty() {
            let s: Vec<_> = self.by_month_day.iter().map(ToString::to_string).collect();
            parts.push(format!("BYMONTHDAY={}", s.join(",")));
        }

        write!(f, "{}", parts.join(";"))
    }
}
