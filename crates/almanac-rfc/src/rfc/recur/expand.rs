//! Recurrence expansion over a query window.
//!
//! Expansion walks a cursor forward from `DTSTART` one step (`INTERVAL`
//! units of `FREQ`) per iteration and turns each step into zero or more
//! candidates. Iteration stops on `COUNT`, `UNTIL`, the window end, or the
//! safety cap, whichever comes first.

use std::num::NonZeroU32;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

use almanac_core::config::RecurrenceConfig;
use almanac_core::constants::DEFAULT_MAX_CANDIDATES;

use super::rule::{Frequency, RecurrenceRule, Weekday};

/// Query window for an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionWindow {
    /// Lower bound; see `inclusive_start`.
    pub start: NaiveDateTime,
    /// Inclusive upper bound.
    pub end: NaiveDateTime,
    /// Whether an occurrence exactly at `start` is returned.
    pub inclusive_start: bool,
}

impl ExpansionWindow {
    /// Creates a window with an inclusive lower bound.
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            inclusive_start: true,
        }
    }

    /// Makes the lower bound exclusive.
    #[must_use]
    pub const fn exclusive_start(mut self) -> Self {
        self.inclusive_start = false;
        self
    }

    /// Returns `true` if `instant` lies inside the window.
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        let after_start = if self.inclusive_start {
            instant >= self.start
        } else {
            instant > self.start
        };
        after_start && instant <= self.end
    }
}

/// Options for recurrence expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionOptions {
    /// Maximum number of candidates generated before expansion is truncated.
    pub max_candidates: usize,

    /// First day of the week frame used for `BYDAY`.
    pub week_start: Weekday,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            week_start: Weekday::Sunday,
        }
    }
}

impl From<&RecurrenceConfig> for ExpansionOptions {
    fn from(config: &RecurrenceConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            week_start: config.week_start.into(),
        }
    }
}

impl ExpansionOptions {
    /// Sets the maximum number of candidates.
    #[must_use]
    pub const fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Sets the first day of the week frame.
    #[must_use]
    pub const fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }
}

/// Loop state carried between iterations.
#[derive(Debug, Default)]
struct ExpansionState {
    /// Iteration index; the cursor is `DTSTART + step * INTERVAL` units.
    step: u32,
    /// Candidates that passed the `DTSTART`/`UNTIL` filters, window or not.
    counted: u32,
    /// Candidates generated since the window was reached (at least one per
    /// iteration).
    generated: usize,
    accepted: Vec<NaiveDateTime>,
}

impl ExpansionState {
    fn count_reached(&self, count: Option<NonZeroU32>) -> bool {
        count.is_some_and(|count| self.counted >= count.get())
    }
}

/// ## Summary
/// Expands a recurrence rule into the occurrences that fall inside `window`.
///
/// A rule without a frequency yields `[dtstart]` (no window filtering); a
/// missing `dtstart` yields nothing. `COUNT` is consumed from `DTSTART`
/// forward regardless of the window, so the same rule returns consistent
/// occurrences for any window.
///
/// Never fails: dates that do not exist (Feb 30, Feb 29 in common years) are
/// skipped and runaway rules are truncated at `options.max_candidates`.
/// Only iterations that reach `window.start` count against that cap, so an
/// event that started years before the window still fills it.
///
/// ## Side Effects
///
/// None - this is a pure function that performs expansion in memory.
#[must_use]
pub fn expand(
    rule: &RecurrenceRule,
    dtstart: Option<NaiveDateTime>,
    window: &ExpansionWindow,
    options: &ExpansionOptions,
) -> Vec<NaiveDateTime> {
    let Some(dtstart) = dtstart else {
        return Vec::new();
    };
    let Some(frequency) = rule.frequency else {
        return vec![dtstart];
    };

    let mut state = ExpansionState {
        step: first_reachable_step(rule, frequency, dtstart, window),
        ..ExpansionState::default()
    };

    loop {
        if state.count_reached(rule.count) {
            break;
        }
        let Some(cursor) = cursor_at(frequency, rule.interval, dtstart, state.step) else {
            tracing::trace!(
                step = state.step,
                "Cursor left the representable date range"
            );
            break;
        };
        if rule.until.is_some_and(|until| cursor > until) {
            break;
        }
        if cursor > window.end {
            break;
        }
        if state.generated >= options.max_candidates {
            tracing::debug!(
                rule = %rule,
                %dtstart,
                max_candidates = options.max_candidates,
                "Recurrence expansion truncated at safety cap"
            );
            break;
        }

        let candidates = candidates_at(rule, frequency, dtstart, cursor, options.week_start);
        if cursor >= window.start || candidates.iter().any(|c| *c >= window.start) {
            state.generated += candidates.len().max(1);
        }

        for candidate in candidates {
            if candidate < dtstart || rule.until.is_some_and(|until| candidate > until) {
                continue;
            }
            if state.count_reached(rule.count) {
                break;
            }
            state.counted += 1;

            if window.contains(candidate) {
                state.accepted.push(candidate);
            }
        }

        let Some(next) = state.step.checked_add(1) else {
            break;
        };
        state.step = next;
    }

    let mut occurrences = state.accepted;
    occurrences.sort_unstable();
    occurrences.dedup();

    tracing::trace!(
        rule = %rule,
        occurrences = occurrences.len(),
        generated = state.generated,
        "Expanded recurrence"
    );

    occurrences
}

/// First iteration whose candidates can reach `window.start`.
///
/// Every earlier step only yields candidates before the window. Without
/// `COUNT` those steps are skipped outright; with `COUNT` they must still be
/// walked because the count is consumed from `DTSTART`.
fn first_reachable_step(
    rule: &RecurrenceRule,
    frequency: Frequency,
    dtstart: NaiveDateTime,
    window: &ExpansionWindow,
) -> u32 {
    if rule.count.is_some() || window.start <= dtstart {
        return 0;
    }

    let (start, anchor) = (window.start, dtstart);
    let years = i64::from(start.year() - anchor.year());
    let months = i64::from(start.month()) - i64::from(anchor.month());
    // Whole months strictly before the window's month.
    let months_before = years * 12 + months - 1;
    let elapsed_units = match frequency {
        Frequency::Daily => (start - anchor).num_days(),
        Frequency::Weekly => (start - anchor).num_days() / 7,
        Frequency::Monthly => months_before,
        Frequency::Yearly => months_before / 12,
    };

    let Ok(elapsed_units) = u64::try_from(elapsed_units) else {
        return 0;
    };
    let step = elapsed_units / u64::from(rule.interval.get());
    u32::try_from(step).unwrap_or(u32::MAX)
}

/// Cursor for iteration `step`, anchored at `dtstart`.
///
/// Month and year steps clamp to the end of a short month; the clamped
/// cursor is only used for termination checks, candidates require the exact
/// day (see [`candidates_at`]).
fn cursor_at(
    frequency: Frequency,
    interval: NonZeroU32,
    dtstart: NaiveDateTime,
    step: u32,
) -> Option<NaiveDateTime> {
    let units = u64::from(step) * u64::from(interval.get());
    match frequency {
        Frequency::Daily => dtstart.checked_add_days(Days::new(units)),
        Frequency::Weekly => dtstart.checked_add_days(Days::new(units.checked_mul(7)?)),
        Frequency::Monthly => {
            let months = u32::try_from(units).ok()?;
            dtstart.checked_add_months(Months::new(months))
        }
        Frequency::Yearly => {
            let months = u32::try_from(units.checked_mul(12)?).ok()?;
            dtstart.checked_add_months(Months::new(months))
        }
    }
}

/// Candidates produced by one iteration, in chronological order.
fn candidates_at(
    rule: &RecurrenceRule,
    frequency: Frequency,
    dtstart: NaiveDateTime,
    cursor: NaiveDateTime,
    week_start: Weekday,
) -> Vec<NaiveDateTime> {
    let time = dtstart.time();
    match frequency {
        Frequency::Weekly if !rule.by_day.is_empty() => {
            weekdays_in_week(cursor.date(), &rule.by_day, week_start, time)
        }
        Frequency::Monthly if !rule.by_month_day.is_empty() => {
            month_days_in_month(cursor.date(), &rule.by_month_day, time)
        }
        Frequency::Monthly | Frequency::Yearly => {
            // A clamped cursor means DTSTART's day does not exist this period.
            if cursor.day() == dtstart.day() {
                vec![cursor]
            } else {
                tracing::trace!(%cursor, day = dtstart.day(), "Skipping non-existent date");
                Vec::new()
            }
        }
        Frequency::Daily | Frequency::Weekly => vec![cursor],
    }
}

/// All requested weekdays of the week (starting on `week_start`) that
/// contains `anchor`.
fn weekdays_in_week(
    anchor: NaiveDate,
    days: &[Weekday],
    week_start: Weekday,
    time: NaiveTime,
) -> Vec<NaiveDateTime> {
    let into_week = Weekday::from(anchor.weekday()).days_since(week_start);
    let Some(frame_start) = anchor.checked_sub_days(Days::new(u64::from(into_week))) else {
        return Vec::new();
    };

    let mut instances: Vec<NaiveDateTime> = days
        .iter()
        .filter_map(|day| {
            frame_start.checked_add_days(Days::new(u64::from(day.days_since(week_start))))
        })
        .map(|date| date.and_time(time))
        .collect();
    instances.sort_unstable();
    instances.dedup();
    instances
}

/// The listed days of `anchor`'s month. Days missing from the month are dropped.
fn month_days_in_month(anchor: NaiveDate, days: &[i8], time: NaiveTime) -> Vec<NaiveDateTime> {
    let (year, month) = (anchor.year(), anchor.month());
    let Some(last_day) = last_day_of_month(year, month) else {
        return Vec::new();
    };

    let mut instances: Vec<NaiveDateTime> = days
        .iter()
        .filter_map(|&day| {
            let day = i32::from(day);
            let resolved = if day > 0 { day } else { last_day + day + 1 };
            let resolved = u32::try_from(resolved).ok().filter(|&d| d >= 1)?;
            NaiveDate::from_ymd_opt(year, month, resolved)
        })
        .map(|date| date.and_time(time))
        .collect();
    instances.sort_unstable();
    instances.dedup();
    instances
}

fn last_day_of_month(year: i32, month: u32) -> Option<i32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    let last = next.pred_opt()?;
    i32::try_from(last.day()).ok()
}
