use chrono::{Datelike, Local, NaiveDate};

use super::models::schedule_model::WeekParity;

/// Decides which recurring entries apply in the week containing `date`.
///
/// Uses the ISO-8601 week number (the week holding the year's first Thursday),
/// so the first days of January may still count towards the previous year's
/// last week. Odd weeks are numerator weeks, even weeks are denominator weeks.
pub fn parity_for_date(date: NaiveDate) -> WeekParity {
    if date.iso_week().week() % 2 == 0 {
        WeekParity::Denominator
    } else {
        WeekParity::Numerator
    }
}

/// Local calendar day, used when no date was asked for.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
