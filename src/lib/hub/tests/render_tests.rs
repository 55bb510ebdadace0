use crate::hub::models::schedule_model::{Parity, SessionType};

use super::*;

fn entry(id: u64, day: DayOfWeek, start: &str, end: &str, parity: Parity) -> ScheduleEntry {
    ScheduleEntry {
        id,
        subject: format!("Предмет {}", id),
        session_type: SessionType::Lecture,
        teacher: "Петров П.П.".to_string(),
        classroom: "301".to_string(),
        time_start: start.to_string(),
        time_end: end.to_string(),
        day,
        parity,
        subgroup: Some("121".to_string()),
    }
}

fn even_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

fn entries() -> Vec<ScheduleEntry> {
    vec![
        entry(1, DayOfWeek::Monday, "09:40", "11:10", Parity::Always),
        entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Denominator),
        entry(3, DayOfWeek::Wednesday, "11:20", "12:50", Parity::Numerator),
    ]
}

#[test]
fn header_names_week_parity() {
    assert_eq!(header(even_week()), "06.03.2024, неделя 10 (Знаменатель)");
}

#[test]
fn columns_show_every_day() {
    let text = render(&entries(), even_week(), ViewMode::Columns);

    for day in DayOfWeek::ALL {
        assert!(text.contains(day.display_name()));
    }
    assert_eq!(text.matches(NO_CLASSES).count(), 5);
    let first = text.find("Предмет 2").unwrap();
    let second = text.find("Предмет 1").unwrap();
    assert!(first < second);
    assert!(!text.contains("Предмет 3"));
}

#[test]
fn list_shows_only_days_with_entries() {
    let text = render(&entries(), even_week(), ViewMode::List);
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("ПН 08:00-09:30  Предмет 2 (Л)"));
    assert!(lines[2].starts_with("ПН 09:40-11:10  Предмет 1 (Л)"));
    assert!(lines[2].ends_with("[121]"));
}

#[test]
fn list_of_an_empty_week_says_so() {
    let text = render(&[], even_week(), ViewMode::List);
    assert_eq!(text.lines().last(), Some(NO_CLASSES));
}

#[test]
fn calendar_places_entries_in_slots() {
    let text = render(&entries(), even_week(), ViewMode::Calendar);
    let lines = text.lines().collect::<Vec<_>>();

    // header, blank line, column titles, six slots
    assert_eq!(lines.len(), 9);
    assert!(lines[2].starts_with("Время"));
    assert!(lines[3].starts_with("08:00-09:30 | Предмет 2 (Л) 301"));
    assert!(lines[4].starts_with("09:40-11:10 | Предмет 1 (Л) 301"));
    assert!(lines[8].starts_with("16:30-18:00 | -"));
}
