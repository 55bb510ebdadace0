//! Internal schedule entities, already detached from the backend's wire shape
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::dto_model::null_as_default;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    #[serde(rename = "ПОНЕДЕЛЬНИК")]
    Monday,
    #[serde(rename = "ВТОРНИК")]
    Tuesday,
    #[serde(rename = "СРЕДА")]
    Wednesday,
    #[serde(rename = "ЧЕТВЕРГ")]
    Thursday,
    #[serde(rename = "ПЯТНИЦА")]
    Friday,
    #[serde(rename = "СУББОТА")]
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 6] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Value the backend expects in the `dayWeek` query parameter.
    pub fn wire(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "ПОНЕДЕЛЬНИК",
            DayOfWeek::Tuesday => "ВТОРНИК",
            DayOfWeek::Wednesday => "СРЕДА",
            DayOfWeek::Thursday => "ЧЕТВЕРГ",
            DayOfWeek::Friday => "ПЯТНИЦА",
            DayOfWeek::Saturday => "СУББОТА",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Понедельник",
            DayOfWeek::Tuesday => "Вторник",
            DayOfWeek::Wednesday => "Среда",
            DayOfWeek::Thursday => "Четверг",
            DayOfWeek::Friday => "Пятница",
            DayOfWeek::Saturday => "Суббота",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "ПН",
            DayOfWeek::Tuesday => "ВТ",
            DayOfWeek::Wednesday => "СР",
            DayOfWeek::Thursday => "ЧТ",
            DayOfWeek::Friday => "ПТ",
            DayOfWeek::Saturday => "СБ",
        }
    }
}

/// Parity of a single ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekParity {
    Numerator,
    Denominator,
}

impl WeekParity {
    pub fn display_name(self) -> &'static str {
        match self {
            WeekParity::Numerator => "Числитель",
            WeekParity::Denominator => "Знаменатель",
        }
    }
}

/// Weeks in which a recurring entry takes place.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parity {
    #[serde(rename = "ЧИСЛИТЕЛЬ")]
    Numerator,
    #[serde(rename = "ЗНАМЕНАТЕЛЬ")]
    Denominator,
    #[serde(rename = "ВСЕГДА")]
    Always,
}

impl Parity {
    pub fn wire(self) -> &'static str {
        match self {
            Parity::Numerator => "ЧИСЛИТЕЛЬ",
            Parity::Denominator => "ЗНАМЕНАТЕЛЬ",
            Parity::Always => "ВСЕГДА",
        }
    }

    pub fn applies_to(self, week: WeekParity) -> bool {
        match self {
            Parity::Always => true,
            Parity::Numerator => week == WeekParity::Numerator,
            Parity::Denominator => week == WeekParity::Denominator,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionType {
    #[serde(rename = "Л")]
    Lecture,
    #[serde(rename = "ПР")]
    Practice,
    #[serde(rename = "ЛАБ")]
    Lab,
}

impl SessionType {
    /// Parses a subject type label, tolerating the `(Л)` form the backend stores.
    pub fn from_label(label: &str) -> Option<Self> {
        match strip_parens(label).trim() {
            "Л" => Some(SessionType::Lecture),
            "ПР" => Some(SessionType::Practice),
            "ЛАБ" => Some(SessionType::Lab),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::Lecture => "Л",
            SessionType::Practice => "ПР",
            SessionType::Lab => "ЛАБ",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn strip_parens(label: &str) -> String {
    label.chars().filter(|c| *c != '(' && *c != ')').collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: u64,
    pub subject: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub teacher: String,
    pub classroom: String,
    pub time_start: String,
    pub time_end: String,
    #[serde(rename = "dayWeek")]
    pub day: DayOfWeek,
    pub parity: Parity,
    #[serde(default)]
    pub subgroup: Option<String>,
}

/// An entry as typed by a user before the backend assigns it an id.
/// `subgroup` holds either a subgroup number or a whole group number.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleDraft {
    pub subject: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub teacher: String,
    pub classroom: String,
    pub time_start: String,
    pub time_end: String,
    #[serde(rename = "dayWeek")]
    pub day: DayOfWeek,
    pub parity: Parity,
    pub subgroup: String,
}

impl Default for ScheduleDraft {
    fn default() -> Self {
        ScheduleDraft {
            subject: String::new(),
            session_type: SessionType::Lecture,
            teacher: String::new(),
            classroom: String::new(),
            time_start: "08:00".to_owned(),
            time_end: "09:30".to_owned(),
            day: DayOfWeek::Monday,
            parity: Parity::Always,
            subgroup: String::new(),
        }
    }
}

impl From<&ScheduleEntry> for ScheduleDraft {
    fn from(entry: &ScheduleEntry) -> Self {
        ScheduleDraft {
            subject: entry.subject.clone(),
            session_type: entry.session_type,
            teacher: entry.teacher.clone(),
            classroom: entry.classroom.clone(),
            time_start: entry.time_start.clone(),
            time_end: entry.time_end.clone(),
            day: entry.day,
            parity: entry.parity,
            subgroup: entry.subgroup.clone().unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub number: String,
    pub direction: String,
    pub profile: String,
    pub faculty_id: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Subgroup {
    pub id: u64,
    pub number: String,
    pub group_id: Option<u64>,
    pub group_number: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: u64,
    pub name: String,
    pub post: String,
    pub faculty_id: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: u64,
    pub name: String,
    /// Raw type label as stored by the backend, e.g. `(Л)`.
    pub kind: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    pub id: u64,
    pub abbreviation: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Monitor,
    Teacher,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn wire(self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Monitor => "MONITOR",
            UserRole::Teacher => "TEACHER",
            UserRole::Admin => "ADMIN",
            UserRole::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub group_number: Option<String>,
    #[serde(default)]
    pub subgroup_number: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub faculty_id: Option<u64>,
    #[serde(default)]
    pub faculty_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Group,
    Teacher,
}

/// A group or teacher picked in the viewer; also the shape of a favorite.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntity {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}
