use chrono::{Datelike, NaiveDateTime};

use almanac_core::config::{Settings, WeekStart};
use almanac_rfc::rfc::recur::{
    ExpansionOptions, ExpansionWindow, Frequency, RecurrenceRule, Weekday, expand, parse_rule,
};
use almanac_test::fixtures::datetime;

fn year_2024() -> ExpansionWindow {
    ExpansionWindow::new(datetime(2024, 1, 1, 0, 0), datetime(2024, 12, 31, 23, 59))
}

fn expand_text(text: &str, dtstart: NaiveDateTime, window: &ExpansionWindow) -> Vec<NaiveDateTime> {
    expand(
        &parse_rule(text),
        Some(dtstart),
        window,
        &ExpansionOptions::default(),
    )
}

/// ## Summary
/// Four weeks of a Monday/Wednesday rule yield eight ascending occurrences.
#[test_log::test]
fn weekly_two_days_over_four_weeks() {
    let window = ExpansionWindow::new(datetime(2024, 1, 1, 0, 0), datetime(2024, 1, 28, 23, 59));
    let occurrences = expand_text(
        "RRULE:FREQ=WEEKLY;BYDAY=MO,WE",
        datetime(2024, 1, 1, 9, 0),
        &window,
    );

    let days: Vec<u32> = occurrences
        .iter()
        .map(Datelike::day)
        .collect();
    assert_eq!(days, vec![1, 3, 8, 10, 15, 17, 22, 24]);
    assert!(occurrences.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn count_bounds_every_frequency() {
    for text in [
        "FREQ=DAILY;COUNT=5",
        "FREQ=WEEKLY;BYDAY=MO,TU,WE;COUNT=5",
        "FREQ=MONTHLY;COUNT=5",
        "FREQ=MONTHLY;BYMONTHDAY=1,15;COUNT=5",
        "FREQ=YEARLY;COUNT=5",
    ] {
        let window = ExpansionWindow::new(datetime(2024, 1, 1, 0, 0), datetime(2040, 1, 1, 0, 0));
        let occurrences = expand_text(text, datetime(2024, 1, 1, 9, 0), &window);
        assert_eq!(occurrences.len(), 5, "rule {text}");
    }
}

#[test]
fn until_bounds_every_occurrence() {
    let until = datetime(2024, 3, 10, 9, 0);
    // 2024-03-10 is a Sunday, so every rule lands exactly on UNTIL.
    for (text, dtstart) in [
        (
            "FREQ=DAILY;UNTIL=20240310T090000",
            datetime(2024, 1, 1, 9, 0),
        ),
        (
            "FREQ=WEEKLY;BYDAY=SU;UNTIL=20240310T090000Z",
            datetime(2024, 1, 7, 9, 0),
        ),
        (
            "FREQ=DAILY;UNTIL=2024-03-10T09:00:00",
            datetime(2024, 1, 1, 9, 0),
        ),
        ("FREQ=WEEKLY;UNTIL=20240310", datetime(2024, 1, 7, 9, 0)),
    ] {
        let occurrences = expand_text(text, dtstart, &year_2024());
        assert!(!occurrences.is_empty(), "rule {text}");
        assert!(occurrences.iter().all(|o| *o <= until), "rule {text}");
        assert_eq!(occurrences.last(), Some(&until), "rule {text}");
    }
}

#[test]
fn rendered_rule_reparses_to_the_same_occurrences() {
    let rule = RecurrenceRule::weekly()
        .with_interval(2)
        .unwrap()
        .with_count(6)
        .unwrap()
        .with_by_day(vec![Weekday::Tuesday, Weekday::Thursday]);

    let reparsed = parse_rule(&rule.to_string());
    assert_eq!(reparsed, rule);

    let options = ExpansionOptions::default();
    let dtstart = Some(datetime(2024, 1, 2, 18, 30));
    assert_eq!(
        expand(&rule, dtstart, &year_2024(), &options),
        expand(&reparsed, dtstart, &year_2024(), &options)
    );
}

#[test]
fn malformed_fragments_do_not_prevent_expansion() {
    let rule = parse_rule("FREQ=DAILY;INTERVAL=zero;COUNT=-1;BYDAY=XX;FOO=BAR;COUNT=3");
    assert_eq!(rule.frequency, Some(Frequency::Daily));

    let occurrences = expand(
        &rule,
        Some(datetime(2024, 1, 1, 9, 0)),
        &year_2024(),
        &ExpansionOptions::default(),
    );
    assert_eq!(occurrences.len(), 3);
}

#[test]
fn configured_week_start_changes_week_frame() {
    let settings = Settings::from_toml_str(
        r#"
        [recurrence]
        week_start = "monday"
        "#,
    )
    .unwrap();
    let options = ExpansionOptions::from(&settings.recurrence);
    assert_eq!(settings.recurrence.week_start, WeekStart::Monday);

    // Wednesday dtstart: the first week's Monday (and, in a Sunday frame,
    // Sunday) precede dtstart and are dropped.
    let rule = parse_rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=SU,MO");
    let dtstart = Some(datetime(2024, 1, 3, 9, 0));
    let window = ExpansionWindow::new(datetime(2024, 1, 1, 0, 0), datetime(2024, 1, 31, 23, 59));

    assert_eq!(
        expand(&rule, dtstart, &window, &options),
        vec![
            datetime(2024, 1, 7, 9, 0),
            datetime(2024, 1, 15, 9, 0),
            datetime(2024, 1, 21, 9, 0),
            datetime(2024, 1, 29, 9, 0),
        ]
    );
    assert_eq!(
        expand(&rule, dtstart, &window, &ExpansionOptions::default()),
        vec![
            datetime(2024, 1, 14, 9, 0),
            datetime(2024, 1, 15, 9, 0),
            datetime(2024, 1, 28, 9, 0),
            datetime(2024, 1, 29, 9, 0),
        ]
    );
}

#[test]
fn configured_cap_truncates_unbounded_rules() {
    let settings = Settings::from_toml_str(
        r#"
        [recurrence]
        max_candidates = 10
        "#,
    )
    .unwrap();
    let options = ExpansionOptions::from(&settings.recurrence);

    let occurrences = expand(
        &parse_rule("FREQ=DAILY"),
        Some(datetime(2024, 1, 1, 9, 0)),
        &year_2024(),
        &options,
    );
    assert_eq!(occurrences.len(), 10);
}

/// ## Summary
/// The expander agrees with the `rrule` crate on rules inside the shared subset.
#[test]
fn agrees_with_reference_engine() {
    for text in [
        "FREQ=DAILY;INTERVAL=3;COUNT=20",
        "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=15",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU;COUNT=10",
        "FREQ=MONTHLY;BYMONTHDAY=15;COUNT=12",
        "FREQ=DAILY;UNTIL=20240301T090000Z",
    ] {
        let reference: rrule::RRuleSet = format!("DTSTART:20240101T090000Z\nRRULE:{text}")
            .parse()
            .expect("reference rule should parse");
        let expected: Vec<NaiveDateTime> = reference
            .all(200)
            .dates
            .iter()
            .map(chrono::DateTime::naive_utc)
            .collect();

        let actual = expand_text(text, datetime(2024, 1, 1, 9, 0), &year_2024());
        assert_eq!(actual, expected, "rule {text}");
    }
}
