use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use super::{
    models::schedule_model::{DayOfWeek, EntityKind, ScheduleEntry},
    parity::parity_for_date,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: &'static str,
    pub end: &'static str,
}

/// Canonical pair slots of the university day.
pub const TIME_SLOTS: [TimeSlot; 6] = [
    TimeSlot { start: "08:00", end: "09:30" },
    TimeSlot { start: "09:40", end: "11:10" },
    TimeSlot { start: "11:20", end: "12:50" },
    TimeSlot { start: "13:10", end: "14:40" },
    TimeSlot { start: "14:50", end: "16:20" },
    TimeSlot { start: "16:30", end: "18:00" },
];

/// One row of the calendar grid: a slot and, per day, the entries starting in it.
#[derive(Debug)]
pub struct SlotRow<'a> {
    pub slot: TimeSlot,
    pub cells: BTreeMap<DayOfWeek, Vec<&'a ScheduleEntry>>,
}

/// Entries that take place in the week of `date`: every `Always` entry plus
/// those whose parity matches the week.
pub fn relevant_entries(entries: &[ScheduleEntry], date: NaiveDate) -> Vec<&ScheduleEntry> {
    let week = parity_for_date(date);
    entries
        .iter()
        .filter(|entry| entry.parity.applies_to(week))
        .collect()
}

/// Relevant entries split into all six weekdays, each sorted by start time.
/// Times are zero-padded `HH:MM`, so comparing strings is enough.
pub fn by_day(entries: &[ScheduleEntry], date: NaiveDate) -> BTreeMap<DayOfWeek, Vec<&ScheduleEntry>> {
    let mut days = DayOfWeek::ALL
        .iter()
        .map(|day| (*day, Vec::new()))
        .collect::<BTreeMap<_, Vec<&ScheduleEntry>>>();
    for entry in relevant_entries(entries, date) {
        days.entry(entry.day).or_default().push(entry);
    }
    for day_entries in days.values_mut() {
        day_entries.sort_by(|a, b| a.time_start.cmp(&b.time_start));
    }
    days
}

/// Relevant entries laid out on the [`TIME_SLOTS`] grid. An entry lands in the
/// slot whose start equals its own; entries off the grid are not shown.
pub fn by_slot(entries: &[ScheduleEntry], date: NaiveDate) -> Vec<SlotRow<'_>> {
    let days = by_day(entries, date);
    TIME_SLOTS
        .iter()
        .map(|slot| SlotRow {
            slot: *slot,
            cells: days
                .iter()
                .map(|(day, day_entries)| {
                    (
                        *day,
                        day_entries
                            .iter()
                            .copied()
                            .filter(|entry| entry.time_start == slot.start)
                            .collect(),
                    )
                })
                .collect(),
        })
        .collect()
}

/// Collapses entries taught identically to every subgroup into one row
/// labelled with the group name. The first entry of each
/// (day, start, end, classroom, subject, teacher, parity) tuple wins.
pub fn dedupe_group_schedule(entries: &[ScheduleEntry], group_name: &str) -> Vec<ScheduleEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| {
            seen.insert((
                entry.day,
                entry.time_start.as_str(),
                entry.time_end.as_str(),
                entry.classroom.as_str(),
                entry.subject.as_str(),
                entry.teacher.as_str(),
                entry.parity,
            ))
        })
        .map(|entry| ScheduleEntry {
            subgroup: Some(group_name.to_owned()),
            ..entry.clone()
        })
        .collect()
}

/// Original per-subgroup entries whose label is among `chosen`.
pub fn filter_by_subgroups(entries: &[ScheduleEntry], chosen: &[String]) -> Vec<ScheduleEntry> {
    entries
        .iter()
        .filter(|entry| {
            let label = entry.subgroup.as_deref().unwrap_or("");
            chosen.iter().any(|wanted| wanted == label)
        })
        .cloned()
        .collect()
}

/// What the viewer shows for a selection before parity is applied.
pub fn visible_schedule(
    entries: &[ScheduleEntry],
    kind: EntityKind,
    name: &str,
    chosen: &[String],
) -> Vec<ScheduleEntry> {
    if !chosen.is_empty() {
        return filter_by_subgroups(entries, chosen);
    }
    match kind {
        EntityKind::Group => dedupe_group_schedule(entries, name),
        EntityKind::Teacher => entries.to_vec(),
    }
}

/// Picks a group's or a teacher's entries out of the full schedule. A group
/// owns every entry whose subgroup label contains its number.
pub fn schedule_for_entity(all: &[ScheduleEntry], kind: EntityKind, name: &str) -> Vec<ScheduleEntry> {
    all.iter()
        .filter(|entry| match kind {
            EntityKind::Group => entry
                .subgroup
                .as_deref()
                .is_some_and(|subgroup| subgroup.contains(name)),
            EntityKind::Teacher => entry.teacher == name,
        })
        .cloned()
        .collect()
}

/// Distinct subgroup labels found in `entries`, the main group first.
pub fn available_subgroups(entries: &[ScheduleEntry], main_group: &str) -> Vec<String> {
    let labels = entries
        .iter()
        .filter_map(|entry| entry.subgroup.as_deref())
        .filter(|label| !label.is_empty())
        .collect::<BTreeSet<_>>();
    let mut ordered = Vec::with_capacity(labels.len());
    if labels.contains(main_group) {
        ordered.push(main_group.to_owned());
    }
    ordered.extend(
        labels
            .into_iter()
            .filter(|label| *label != main_group)
            .map(str::to_owned),
    );
    ordered
}

#[cfg(test)]
#[path = "tests/grouping_tests.rs"]
mod tests;
