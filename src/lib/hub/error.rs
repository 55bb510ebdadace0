use std::fmt;

use thiserror::Error;

use super::models::schedule_model::ScheduleEntry;

/// The backend refused a save because another entry already takes the slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConflict {
    pub message: String,
    /// The entry that clashes with the one being saved.
    pub existing: ScheduleEntry,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors produced while talking to the schedule backend or preparing a request for it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(Box<ScheduleConflict>),
    #[error("{0}")]
    Validation(String),
    #[error(
        "Could not resolve related data: teacher({}), subject({}), subgroup/group({})",
        fmt_id(.teacher_id),
        fmt_id(.subject_id),
        fmt_ids(.subgroup_ids)
    )]
    UnresolvedReference {
        teacher_id: Option<u64>,
        subject_id: Option<u64>,
        subgroup_ids: Vec<u64>,
    },
}

impl ApiError {
    /// HTTP status behind the error, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::Conflict(_) => Some(409),
            _ => None,
        }
    }
}

fn fmt_id(id: &Option<u64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "null".to_owned())
}

fn fmt_ids(ids: &[u64]) -> String {
    if ids.is_empty() {
        "null".to_owned()
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
