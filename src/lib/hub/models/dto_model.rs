//! Wire models compatible with the schedule backend's REST API, and the
//! mappings from them into [`schedule_model`](super::schedule_model) entities.
//!
//! Every DTO defaults its absent and `null` fields, so each `map_*` function is total.
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use super::schedule_model::{
    DayOfWeek, Faculty, Group, Parity, ScheduleEntry, SessionType, Subgroup, Subject, Teacher,
    UserRole,
};

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FacultyDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub abbreviation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub faculty_name: String,
}

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub direction: String,
    #[serde(deserialize_with = "null_as_default")]
    pub profile: String,
    pub faculty: Option<FacultyDto>,
    pub faculty_id: Option<u64>,
}

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SubgroupDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    pub group_dto: Option<GroupDto>,
}

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub post: String,
    pub faculty: Option<FacultyDto>,
}

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct SubjectDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Deserialize, Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleDto {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "lenient")]
    pub parity: Option<Parity>,
    pub subgroup_dto: Option<SubgroupDto>,
    pub subject_dto: Option<SubjectDto>,
    pub teacher_dto: Option<TeacherDto>,
    #[serde(deserialize_with = "lenient")]
    pub day_week: Option<DayOfWeek>,
    #[serde(deserialize_with = "null_as_default")]
    pub time_start: String,
    #[serde(deserialize_with = "null_as_default")]
    pub time_end: String,
    #[serde(deserialize_with = "null_as_default")]
    pub classroom: String,
}

/// Body of a 409 answer to a schedule save.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConflictResponse {
    pub message: Option<String>,
    pub conflict: Option<ScheduleDto>,
}

/// Generic error envelope; either field may carry the human-readable text.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthResponse {
    /// Older backend builds answer with `token` instead of `accessToken`.
    pub fn access(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

#[derive(Serialize, Debug)]
pub struct AuthenticateRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "group_number", skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    #[serde(rename = "subgroup_number", skip_serializing_if = "Option::is_none")]
    pub subgroup_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGroupRequest {
    pub number: String,
    pub direction: String,
    pub profile: String,
    pub faculty_id: u64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacherRequest {
    pub name: String,
    pub post: String,
    pub faculty_id: u64,
}

#[derive(Serialize, Debug, Clone)]
pub struct NewSubjectRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct GroupNumberRef {
    pub number: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubgroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub number: String,
    pub group_dto: GroupNumberRef,
    pub size: u32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<u64>,
}

/// Partial user update; absent fields are sent as `null` and left alone by the backend.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub faculty_id: Option<u64>,
    pub group_number: Option<String>,
    pub subgroup_number: Option<String>,
}

/// Reads `null` as the field type's default, as for a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads `null` or a value this client does not know as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Trims `HH:MM:SS` to `HH:MM` so that times compare against the slot table.
pub fn normalize_time(time: &str) -> String {
    let bytes = time.as_bytes();
    if bytes.len() == 8 && bytes[2] == b':' && bytes[5] == b':' {
        time[..5].to_owned()
    } else {
        time.to_owned()
    }
}

pub fn normalize_post(post: &str) -> String {
    let trimmed = post.trim();
    if trimmed.is_empty() {
        return "Неизвестно".to_owned();
    }
    match trimmed.to_lowercase().as_str() {
        "доц" | "доцент" => "Доцент".to_owned(),
        "проф" | "профессор" => "Профессор".to_owned(),
        "ассистент" => "Ассистент".to_owned(),
        _ => trimmed.to_owned(),
    }
}

pub fn map_schedule_dto(dto: ScheduleDto) -> ScheduleEntry {
    let subject = dto.subject_dto.unwrap_or_default();
    ScheduleEntry {
        id: dto.id,
        session_type: SessionType::from_label(&subject.kind).unwrap_or(SessionType::Lecture),
        subject: subject.name,
        teacher: dto.teacher_dto.map(|teacher| teacher.name).unwrap_or_default(),
        classroom: dto.classroom,
        time_start: normalize_time(&dto.time_start),
        time_end: normalize_time(&dto.time_end),
        day: dto.day_week.unwrap_or(DayOfWeek::Monday),
        parity: dto.parity.unwrap_or(Parity::Always),
        subgroup: dto
            .subgroup_dto
            .map(|subgroup| subgroup.number)
            .filter(|number| !number.is_empty()),
    }
}

pub fn map_group_dto(dto: GroupDto) -> Group {
    Group {
        id: dto.id,
        faculty_id: dto
            .faculty
            .as_ref()
            .map(|faculty| faculty.id)
            .or(dto.faculty_id)
            .unwrap_or(0),
        number: dto.number,
        direction: dto.direction,
        profile: dto.profile,
    }
}

pub fn map_subgroup_dto(dto: SubgroupDto) -> Subgroup {
    let group = dto.group_dto;
    Subgroup {
        id: dto.id,
        number: dto.number,
        group_id: group.as_ref().map(|group| group.id).filter(|id| *id != 0),
        group_number: group
            .map(|group| group.number)
            .filter(|number| !number.is_empty()),
    }
}

pub fn map_teacher_dto(dto: TeacherDto) -> Teacher {
    Teacher {
        id: dto.id,
        post: normalize_post(&dto.post),
        faculty_id: dto.faculty.map(|faculty| faculty.id).unwrap_or(0),
        name: dto.name,
    }
}

pub fn map_subject_dto(dto: SubjectDto) -> Subject {
    Subject {
        id: dto.id,
        name: dto.name,
        kind: dto.kind,
    }
}

pub fn map_faculty_dto(dto: FacultyDto) -> Faculty {
    Faculty {
        id: dto.id,
        abbreviation: dto.abbreviation,
        name: dto.faculty_name,
    }
}

#[cfg(test)]
#[path = "../tests/dto_model_tests.rs"]
mod tests;
