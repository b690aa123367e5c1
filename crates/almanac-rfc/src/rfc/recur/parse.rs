//! Tolerant parser for stored recurrence rule text.
//!
//! This parser never rejects input. Fragments it cannot interpret are
//! dropped (and traced) so that a partially garbled rule still yields
//! whatever it can; deciding whether the result is useful is the caller's job.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::rule::{Frequency, RecurrenceRule, Weekday, is_valid_month_day};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d"];

/// ## Summary
/// Parses `KEY=VALUE[;KEY=VALUE...]` recurrence rule text.
///
/// Keys and values are case-insensitive and an optional `RRULE:` prefix is
/// accepted. Unknown keys, fragments without `=`, and values that do not
/// parse are skipped individually; the rest of the rule is kept.
#[must_use]
pub fn parse_rule(text: &str) -> RecurrenceRule {
    let mut rule = RecurrenceRule::new();

    let body = strip_prefix_ignore_case(text.trim(), "RRULE:");

    for part in body.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let Some((key, value)) = part.split_once('=') else {
            tracing::trace!(fragment = %part, "Dropping RRULE fragment without '='");
            continue;
        };

        apply_rule_part(&mut rule, key.trim(), value.trim());
    }

    rule
}

/// Applies a single key-value pair. Invalid values leave the field untouched.
fn apply_rule_part(rule: &mut RecurrenceRule, key: &str, value: &str) {
    match key.to_ascii_uppercase().as_str() {
        "FREQ" => match Frequency::parse(value) {
            Some(frequency) => rule.frequency = Some(frequency),
            None => tracing::trace!(value, "Dropping unsupported FREQ"),
        },
        "INTERVAL" => match parse_positive(value) {
            Some(interval) => rule.interval = interval,
            None => tracing::trace!(value, "Dropping invalid INTERVAL"),
        },
        "COUNT" => match parse_positive(value) {
            Some(count) => rule.count = Some(count),
            None => tracing::trace!(value, "Dropping invalid COUNT"),
        },
        "UNTIL" => match parse_until(value) {
            Some(until) => rule.until = Some(until),
            None => tracing::trace!(value, "Dropping unparseable UNTIL"),
        },
        "BYDAY" => rule.by_day = parse_byday(value),
        "BYMONTHDAY" => rule.by_month_day = parse_month_days(value),
        _ => {
            tracing::trace!(key, "Ignoring unsupported RRULE part");
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> &'a str {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &s[prefix.len()..],
        _ => s,
    }
}

fn parse_positive(value: &str) -> Option<NonZeroU32> {
    value.parse::<u32>().ok().and_then(NonZeroU32::new)
}

/// ## Summary
/// Parses an `UNTIL` token permissively.
///
/// Accepts the RFC 5545 basic forms (`20240115`, `20240115T090000`), ISO 8601
/// extended forms (`2024-01-15`, `2024-01-15T09:00[:00]`) and RFC 3339
/// timestamps. A trailing `Z` or offset is not applied: the wall-clock value
/// is taken as written. A date without a time means the end of that day.
#[must_use]
pub fn parse_until(value: &str) -> Option<NaiveDateTime> {
    let token = value.trim();

    if let Ok(stamped) = DateTime::parse_from_rfc3339(token) {
        return Some(stamped.naive_local());
    }

    let token = token.trim_end_matches(['Z', 'z']);

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(token, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
                .and_then(|date| date.and_hms_opt(23, 59, 59))
        })
}

/// Parses a BYDAY list, dropping ordinal forms and unknown codes.
fn parse_byday(value: &str) -> Vec<Weekday> {
    let mut days = Vec::new();
    for code in value.split(',').map(str::trim) {
        match Weekday::parse(code) {
            Some(day) if !days.contains(&day) => days.push(day),
            Some(_) => {}
            None => tracing::trace!(code, "Dropping unsupported BYDAY entry"),
        }
    }
    days
}

fn parse_month_days(value: &str) -> Vec<i8> {
    let mut days = Vec::new();
    for entry in value.split(',').map(str::trim) {
        match entry.parse::<i8>() {
            Ok(day) if is_valid_month_day(day) => {
                if !days.contains(&day) {
                    days.push(day);
                }
            }
            _ => tracing::trace!(entry, "Dropping invalid BYMONTHDAY entry"),
        }
    }
    days
}
