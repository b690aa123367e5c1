//! Recurrence rules: value types, tolerant parsing and expansion.
//!
//! The rule text is the on-disk representation stored next to an event.
//! Parsing never fails; expansion never fails and is bounded by a safety cap.

mod expand;
mod parse;
mod rule;

pub use expand::{ExpansionOptions, ExpansionWindow, expand};
pub use parse::{parse_rule, parse_until};
pub use rule::{Frequency, RecurrenceRule, Weekday};
