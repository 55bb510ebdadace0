use chrono::NaiveDate;

use crate::hub::models::schedule_model::{DayOfWeek, EntityKind, Parity, ScheduleEntry, SessionType};

use super::*;

fn make_entry(
    id: u64,
    day: DayOfWeek,
    start: &str,
    end: &str,
    parity: Parity,
    subgroup: &str,
) -> ScheduleEntry {
    ScheduleEntry {
        id,
        subject: "Матанализ".to_string(),
        session_type: SessionType::Lecture,
        teacher: "Иванов И.И.".to_string(),
        classroom: "301".to_string(),
        time_start: start.to_string(),
        time_end: end.to_string(),
        day,
        parity,
        subgroup: Some(subgroup.to_string()),
    }
}

// ISO week 10 of 2024
fn even_week_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

// ISO week 11 of 2024
fn odd_week_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
}

fn mixed_parity_entries() -> Vec<ScheduleEntry> {
    vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Monday, "09:40", "11:10", Parity::Always, "121-1"),
        make_entry(3, DayOfWeek::Tuesday, "08:00", "09:30", Parity::Numerator, "121-1"),
        make_entry(4, DayOfWeek::Wednesday, "11:20", "12:50", Parity::Denominator, "121-1"),
        make_entry(5, DayOfWeek::Wednesday, "13:10", "14:40", Parity::Denominator, "121-1"),
        make_entry(6, DayOfWeek::Friday, "14:50", "16:20", Parity::Denominator, "121-1"),
    ]
}

fn ids(entries: &[&ScheduleEntry]) -> Vec<u64> {
    entries.iter().map(|entry| entry.id).collect()
}

#[test]
fn relevant_entries_even_week_keeps_always_and_denominator() {
    let entries = mixed_parity_entries();
    let relevant = relevant_entries(&entries, even_week_date());
    assert_eq!(relevant.len(), 5);
    assert_eq!(ids(&relevant), vec![1, 2, 4, 5, 6]);
}

#[test]
fn relevant_entries_odd_week_keeps_always_and_numerator() {
    let entries = mixed_parity_entries();
    let relevant = relevant_entries(&entries, odd_week_date());
    assert_eq!(relevant.len(), 3);
    assert_eq!(ids(&relevant), vec![1, 2, 3]);
}

#[test]
fn by_day_has_all_six_days_sorted_by_start() {
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "13:10", "14:40", Parity::Always, "121"),
        make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121"),
        make_entry(3, DayOfWeek::Monday, "09:40", "11:10", Parity::Always, "121"),
        make_entry(4, DayOfWeek::Saturday, "08:00", "09:30", Parity::Always, "121"),
    ];
    let days = by_day(&entries, even_week_date());
    assert_eq!(days.len(), 6);
    assert_eq!(ids(&days[&DayOfWeek::Monday]), vec![2, 3, 1]);
    assert!(days[&DayOfWeek::Tuesday].is_empty());
    assert_eq!(ids(&days[&DayOfWeek::Saturday]), vec![4]);
    assert_eq!(days.keys().copied().collect::<Vec<_>>(), DayOfWeek::ALL.to_vec());
}

#[test]
fn by_slot_puts_split_subgroups_into_the_same_cell() {
    let entries = vec![
        make_entry(1, DayOfWeek::Tuesday, "09:40", "11:10", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Tuesday, "09:40", "11:10", Parity::Always, "121-2"),
        make_entry(3, DayOfWeek::Tuesday, "11:20", "12:50", Parity::Always, "121-1"),
        make_entry(4, DayOfWeek::Tuesday, "10:00", "11:30", Parity::Always, "121-1"),
    ];
    let rows = by_slot(&entries, even_week_date());
    assert_eq!(rows.len(), TIME_SLOTS.len());
    assert_eq!(rows[1].slot, TIME_SLOTS[1]);
    assert_eq!(ids(&rows[1].cells[&DayOfWeek::Tuesday]), vec![1, 2]);
    assert_eq!(ids(&rows[2].cells[&DayOfWeek::Tuesday]), vec![3]);
    assert!(rows[0].cells[&DayOfWeek::Tuesday].is_empty());
    // 10:00 is off the grid
    let placed = rows
        .iter()
        .flat_map(|row| row.cells.values())
        .map(|cell| cell.len())
        .sum::<usize>();
    assert_eq!(placed, 3);
}

#[test]
fn identical_subgroup_entries_collapse_to_group() {
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-2"),
        make_entry(3, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-3"),
    ];

    let collapsed = visible_schedule(&entries, EntityKind::Group, "121", &[]);
    assert_eq!(collapsed.len(), 1);
    assert_eq!(collapsed[0].id, 1);
    assert_eq!(collapsed[0].subgroup.as_deref(), Some("121"));

    let chosen = vec!["121-1".to_string(), "121-2".to_string(), "121-3".to_string()];
    let expanded = visible_schedule(&entries, EntityKind::Group, "121", &chosen);
    assert_eq!(expanded, entries);
}

#[test]
fn dedupe_keeps_entries_that_differ_in_any_key_field() {
    let mut other_room = make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-2");
    other_room.classroom = "302".to_string();
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        other_room,
        make_entry(3, DayOfWeek::Monday, "08:00", "09:30", Parity::Numerator, "121-3"),
    ];
    let collapsed = dedupe_group_schedule(&entries, "121");
    assert_eq!(collapsed.len(), 3);
    assert!(collapsed
        .iter()
        .all(|entry| entry.subgroup.as_deref() == Some("121")));
}

#[test]
fn filter_by_subgroups_keeps_only_chosen_labels() {
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-2"),
    ];
    let filtered = filter_by_subgroups(&entries, &["121-2".to_string()]);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, 2);
    assert_eq!(filtered[0].subgroup.as_deref(), Some("121-2"));
}

#[test]
fn teacher_view_is_not_collapsed() {
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-2"),
    ];
    let visible = visible_schedule(&entries, EntityKind::Teacher, "Иванов И.И.", &[]);
    assert_eq!(visible, entries);
}

#[test]
fn schedule_for_entity_matches_group_and_teacher() {
    let mut other_teacher = make_entry(3, DayOfWeek::Friday, "08:00", "09:30", Parity::Always, "122-1");
    other_teacher.teacher = "Петров П.П.".to_string();
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-1"),
        make_entry(2, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121"),
        other_teacher,
    ];
    let group = schedule_for_entity(&entries, EntityKind::Group, "121");
    assert_eq!(group.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
    let teacher = schedule_for_entity(&entries, EntityKind::Teacher, "Петров П.П.");
    assert_eq!(teacher.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3]);
}

#[test]
fn available_subgroups_lists_main_group_first() {
    let entries = vec![
        make_entry(1, DayOfWeek::Monday, "08:00", "09:30", Parity::Always, "121-2"),
        make_entry(2, DayOfWeek::Monday, "09:40", "11:10", Parity::Always, "121"),
        make_entry(3, DayOfWeek::Monday, "11:20", "12:50", Parity::Always, "121-1"),
        make_entry(4, DayOfWeek::Monday, "13:10", "14:40", Parity::Always, "121-2"),
    ];
    assert_eq!(
        available_subgroups(&entries, "121"),
        vec!["121".to_string(), "121-1".to_string(), "121-2".to_string()]
    );
}
