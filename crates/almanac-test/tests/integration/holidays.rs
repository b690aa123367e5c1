use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use almanac_core::config::Settings;
use almanac_service::holiday::{
    DangiConverter, HolidayEngine, HolidayKind, HolidayRecord, HolidayTable, LunarDate, LunarTable,
};
use almanac_test::fixtures::{date, korean_engine, korean_lunar_table};

fn titled<'a>(records: &'a [HolidayRecord], title: &str) -> Vec<&'a HolidayRecord> {
    records.iter().filter(|r| r.title == title).collect()
}

#[test_log::test]
fn korea_2026_calendar() {
    let records = korean_engine().compute(2026);

    let substitutes: Vec<(NaiveDate, &str)> = records
        .iter()
        .filter(|r| r.kind == HolidayKind::Substitute)
        .map(|r| (r.date, r.title.as_str()))
        .collect();
    assert_eq!(
        substitutes,
        vec![
            (
                date(2026, 3, 2),
                "Substitute Holiday (Independence Movement Day)"
            ),
            (date(2026, 5, 25), "Substitute Holiday (Buddha's Birthday)"),
            (date(2026, 6, 8), "Substitute Holiday (Memorial Day)"),
            (date(2026, 8, 17), "Substitute Holiday (Liberation Day)"),
            (
                date(2026, 10, 5),
                "Substitute Holiday (National Foundation Day)"
            ),
        ]
    );

    let seollal: Vec<NaiveDate> = titled(&records, "Seollal").iter().map(|r| r.date).collect();
    assert_eq!(
        seollal,
        vec![date(2026, 2, 16), date(2026, 2, 17), date(2026, 2, 18)]
    );

    // Chuseok 2026 ends on a Saturday but multi-day festivals are never substituted.
    let chuseok = titled(&records, "Chuseok");
    assert_eq!(chuseok.len(), 3);
    assert_eq!(chuseok[2].date.weekday(), Weekday::Sat);

    assert_eq!(records.len(), 9 + 7 + 5);
}

#[test]
fn every_record_is_in_the_requested_year_and_sorted() {
    let engine = korean_engine();
    for year in 2024..=2026 {
        let records = engine.compute(year);
        assert!(records.iter().all(|r| r.date.year() == year), "year {year}");
        assert!(
            records.windows(2).all(|pair| pair[0].date <= pair[1].date),
            "year {year}"
        );
    }
}

#[test]
fn substitutes_follow_weekend_holidays_only() {
    let engine = korean_engine();
    for year in 2024..=2026 {
        let records = engine.compute(year);
        let multi_day: HashSet<&str> = ["Seollal", "Chuseok"].into_iter().collect();

        for record in &records {
            let expected_shift = match record.date.weekday() {
                Weekday::Sat => Some(2),
                Weekday::Sun => Some(1),
                _ => None,
            };
            let substitute_title = format!("Substitute Holiday ({})", record.title);
            let substitute = records
                .iter()
                .find(|r| r.kind == HolidayKind::Substitute && r.title == substitute_title);

            let wants_substitute = record.kind != HolidayKind::Substitute
                && record.is_observed
                && !multi_day.contains(record.title.as_str())
                && expected_shift.is_some();

            if wants_substitute {
                let shift = expected_shift.unwrap_or_default();
                let substitute = substitute.expect("weekend holiday should have a substitute");
                assert_eq!(
                    (substitute.date - record.date).num_days(),
                    shift,
                    "{} in {year}",
                    record.title
                );
            } else if record.kind != HolidayKind::Substitute {
                assert!(
                    substitute.is_none(),
                    "{} on {} should not be substituted",
                    record.title,
                    record.date
                );
            }
        }
    }
}

#[test]
fn buddhas_birthday_can_coincide_with_childrens_day() {
    // 2025-05-05: both holidays fall on the same Monday.
    let records = korean_engine().compute(2025);
    let may5: Vec<&str> = records
        .iter()
        .filter(|r| r.date == date(2025, 5, 5))
        .map(|r| r.title.as_str())
        .collect();

    assert_eq!(may5, vec!["Children's Day", "Buddha's Birthday"]);
}

#[test]
fn years_without_lunar_data_still_have_fixed_holidays() {
    let records = korean_engine().compute(2030);

    assert!(records.iter().all(|r| r.kind != HolidayKind::Lunar));
    assert_eq!(
        records
            .iter()
            .filter(|r| r.kind == HolidayKind::Fixed)
            .count(),
        9
    );
}

#[test]
fn dangi_calendar_agrees_with_known_festival_dates() {
    let computed = HolidayEngine::new(HolidayTable::korea(), DangiConverter::new());

    assert_eq!(
        computed.compute_range(2024..=2026),
        korean_engine().compute_range(2024..=2026)
    );
}

#[test_log::test]
fn dangi_calendar_covers_later_years() {
    let engine = HolidayEngine::new(HolidayTable::korea(), DangiConverter::new());
    let records = engine.compute(2030);

    let seollal: Vec<NaiveDate> = titled(&records, "Seollal").iter().map(|r| r.date).collect();
    assert_eq!(
        seollal,
        vec![date(2030, 2, 2), date(2030, 2, 3), date(2030, 2, 4)]
    );
    assert_eq!(titled(&records, "Chuseok").len(), 3);
    assert_eq!(titled(&records, "Buddha's Birthday").len(), 1);
}

#[test]
fn concurrent_computation_matches_sequential() {
    let engine = korean_engine();
    let sequential: Vec<_> = (2024..=2026).map(|year| engine.compute(year)).collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (2024..=2026)
            .map(|year| {
                let engine = &engine;
                scope.spawn(move || engine.compute(year))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should not panic"))
            .collect()
    });

    assert_eq!(concurrent, sequential);
}

#[test]
fn range_matches_per_year_concatenation() {
    let engine = korean_engine();
    let range = engine.compute_range(2024..=2026);
    let concatenated: Vec<_> = (2024..=2026)
        .flat_map(|year| engine.compute(year))
        .collect();

    assert_eq!(range, concatenated);
}

#[test]
fn lunar_dates_from_configuration_drive_the_engine() {
    let settings = Settings::from_toml_str(
        r#"
        [[lunar_dates]]
        lunar = { year = 2025, month = 8, day = 15 }
        solar = "2025-10-06"
        "#,
    )
    .unwrap();

    let engine = HolidayEngine::new(
        HolidayTable::korea(),
        LunarTable::from(settings.lunar_dates.as_slice()),
    );
    let records = engine.compute(2025);

    let chuseok: Vec<NaiveDate> = titled(&records, "Chuseok").iter().map(|r| r.date).collect();
    assert_eq!(
        chuseok,
        vec![date(2025, 10, 5), date(2025, 10, 6), date(2025, 10, 7)]
    );
    assert!(titled(&records, "Seollal").is_empty());
}

#[test]
fn fixture_table_matches_known_festival_dates() {
    let table = korean_lunar_table();
    assert_eq!(table.len(), 9);

    let seollal_2025 = date(2025, 1, 29);
    let engine = HolidayEngine::new(HolidayTable::korea(), table);
    assert!(
        engine
            .compute(2025)
            .iter()
            .any(|r| r.title == "Seollal" && r.date == seollal_2025)
    );
    assert_ne!(LunarDate::new(2025, 1, 1), LunarDate::leap(2025, 1, 1));
}

#[test]
fn custom_table_from_file() {
    let path = std::env::temp_dir().join(format!("almanac-table-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [[fixed]]
        month = 7
        day = 4
        title = "Independence Day"

        [[lunar]]
        month = 1
        day = 1
        title = "Lunar New Year"
        span = "three_day"
        "#,
    )
    .unwrap();

    let table = HolidayTable::from_file(&path);
    std::fs::remove_file(&path).unwrap();
    let table = table.unwrap();

    // 2026-07-04 is a Saturday.
    let records = HolidayEngine::new(table, korean_lunar_table()).compute(2026);
    let summary: Vec<(NaiveDate, &str)> = records
        .iter()
        .map(|r| (r.date, r.title.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (date(2026, 2, 16), "Lunar New Year"),
            (date(2026, 2, 17), "Lunar New Year"),
            (date(2026, 2, 18), "Lunar New Year"),
            (date(2026, 7, 4), "Independence Day"),
            (date(2026, 7, 6), "Substitute Holiday (Independence Day)"),
        ]
    );
}
