//! Recurrence rule support for almanac.
//!
//! Implements the subset of the RFC 5545 RRULE grammar that stored events
//! use (`FREQ`, `INTERVAL`, `UNTIL`, `COUNT`, `BYDAY`, `BYMONTHDAY`) and the
//! expansion of such rules into naive wall-clock occurrences.

pub mod error;
pub mod rfc;
