//! Terminal rendering of a week of entries.
use chrono::{Datelike, NaiveDate};

use super::{
    grouping::{by_day, by_slot},
    models::{
        schedule_model::{DayOfWeek, ScheduleEntry},
        ViewMode,
    },
    parity::parity_for_date,
};

const NO_CLASSES: &str = "Нет пар";

/// Renders the entries that take place in the week of `date`.
pub fn render(entries: &[ScheduleEntry], date: NaiveDate, mode: ViewMode) -> String {
    let mut lines = vec![header(date)];
    match mode {
        ViewMode::Columns => render_columns(entries, date, &mut lines),
        ViewMode::List => render_list(entries, date, &mut lines),
        ViewMode::Calendar => render_calendar(entries, date, &mut lines),
    }
    lines.join("\n")
}

/// Date, ISO week number and its parity, e.g. `06.03.2024, неделя 10 (Знаменатель)`.
pub fn header(date: NaiveDate) -> String {
    format!(
        "{}, неделя {} ({})",
        date.format("%d.%m.%Y"),
        date.iso_week().week(),
        parity_for_date(date).display_name()
    )
}

/// Single-line summary of an entry.
pub fn describe(entry: &ScheduleEntry) -> String {
    let mut text = format!(
        "{}-{}  {} ({})  {}  ауд. {}",
        entry.time_start, entry.time_end, entry.subject, entry.session_type, entry.teacher, entry.classroom
    );
    if let Some(subgroup) = entry.subgroup.as_deref().filter(|label| !label.is_empty()) {
        text.push_str(&format!("  [{}]", subgroup));
    }
    text
}

fn render_columns(entries: &[ScheduleEntry], date: NaiveDate, lines: &mut Vec<String>) {
    for (day, day_entries) in by_day(entries, date) {
        lines.push(String::new());
        lines.push(day.display_name().to_owned());
        if day_entries.is_empty() {
            lines.push(format!("  {}", NO_CLASSES));
        }
        lines.extend(day_entries.into_iter().map(|entry| format!("  {}", describe(entry))));
    }
}

fn render_list(entries: &[ScheduleEntry], date: NaiveDate, lines: &mut Vec<String>) {
    let days = by_day(entries, date);
    if days.values().all(Vec::is_empty) {
        lines.push(NO_CLASSES.to_owned());
        return;
    }
    for (day, day_entries) in days {
        lines.extend(
            day_entries
                .into_iter()
                .map(|entry| format!("{} {}", day.short_name(), describe(entry))),
        );
    }
}

fn calendar_cell(entries: &[&ScheduleEntry]) -> String {
    if entries.is_empty() {
        return "-".to_owned();
    }
    entries
        .iter()
        .map(|entry| format!("{} ({}) {}", entry.subject, entry.session_type, entry.classroom))
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_calendar(entries: &[ScheduleEntry], date: NaiveDate, lines: &mut Vec<String>) {
    let mut table = vec![std::iter::once("Время".to_owned())
        .chain(DayOfWeek::ALL.iter().map(|day| day.short_name().to_owned()))
        .collect::<Vec<_>>()];
    for row in by_slot(entries, date) {
        let mut cells = vec![format!("{}-{}", row.slot.start, row.slot.end)];
        cells.extend(DayOfWeek::ALL.iter().map(|day| {
            calendar_cell(row.cells.get(day).map(Vec::as_slice).unwrap_or_default())
        }));
        table.push(cells);
    }

    let widths = (0..=DayOfWeek::ALL.len())
        .map(|column| {
            table
                .iter()
                .map(|cells| cells[column].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    for cells in table {
        let padded = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{}{}", cell, " ".repeat(width - cell.chars().count())))
            .collect::<Vec<_>>();
        lines.push(padded.join(" | ").trim_end().to_owned());
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
