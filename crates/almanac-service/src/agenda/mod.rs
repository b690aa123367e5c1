//! Merged agenda of stored events and holidays over a window.
//!
//! Recurring events are expanded with the recurrence expander; holidays are
//! computed for every calendar year the window touches.

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use almanac_rfc::rfc::recur::{ExpansionOptions, ExpansionWindow, expand, parse_rule};

use crate::holiday::{HolidayEngine, HolidayRecord, LunarConverter};

/// An event as persisted by a calendar store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub title: String,
    pub start: NaiveDateTime,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    /// Raw recurrence rule text, e.g. `FREQ=WEEKLY;BYDAY=MO`.
    #[serde(default)]
    pub recurrence_rule: Option<String>,
}

impl StoredEvent {
    #[must_use]
    pub fn new(title: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end: None,
            recurrence_rule: None,
        }
    }

    #[must_use]
    pub const fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence_rule = Some(rule.into());
        self
    }

    fn duration(&self) -> TimeDelta {
        self.end.map_or_else(TimeDelta::zero, |end| end - self.start)
    }
}

/// One line of an agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgendaEntry {
    Holiday(HolidayRecord),
    Event {
        title: String,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    },
}

impl AgendaEntry {
    /// Holidays start at midnight of their date.
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        match self {
            Self::Holiday(record) => record.date.and_time(NaiveTime::MIN),
            Self::Event { start, .. } => *start,
        }
    }

    const fn is_holiday(&self) -> bool {
        matches!(self, Self::Holiday(_))
    }
}

/// ## Summary
/// Builds the agenda for `window`: every occurrence of every event plus
/// every holiday whose date falls inside the window.
///
/// Entries are ordered by start instant; holidays precede events starting
/// at the same instant.
#[must_use]
pub fn build_agenda<C: LunarConverter>(
    events: &[StoredEvent],
    window: &ExpansionWindow,
    engine: &HolidayEngine<C>,
    options: &ExpansionOptions,
) -> Vec<AgendaEntry> {
    let mut entries: Vec<AgendaEntry> = events
        .iter()
        .flat_map(|event| event_occurrences(event, window, options))
        .collect();

    let holidays = engine
        .compute_range(window.start.year()..=window.end.year())
        .into_iter()
        .filter(|record| (window.start.date()..=window.end.date()).contains(&record.date))
        .map(AgendaEntry::Holiday);
    entries.extend(holidays);

    entries.sort_by_key(|entry| (entry.starts_at(), !entry.is_holiday()));

    tracing::debug!(
        events = events.len(),
        entries = entries.len(),
        "Built agenda"
    );
    entries
}

fn event_occurrences(
    event: &StoredEvent,
    window: &ExpansionWindow,
    options: &ExpansionOptions,
) -> Vec<AgendaEntry> {
    let duration = event.duration();

    let starts = match event.recurrence_rule.as_deref() {
        Some(text) => {
            let rule = parse_rule(text);
            expand(&rule, Some(event.start), window, options)
        }
        None => vec![event.start],
    };

    starts
        .into_iter()
        .filter(|start| window.contains(*start))
        .map(|start| AgendaEntry::Event {
            title: event.title.clone(),
            start,
            end: event.end.map(|_| occurrence_end(&event.title, start, duration)),
        })
        .collect()
}

/// End of the occurrence at `start`. An end that overflows the calendar is
/// clamped to its last representable instant.
fn occurrence_end(title: &str, start: NaiveDateTime, duration: TimeDelta) -> NaiveDateTime {
    start.checked_add_signed(duration).unwrap_or_else(|| {
        tracing::debug!(title, %start, "Occurrence end out of range, clamped");
        if duration < TimeDelta::zero() {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        }
    })
}
