//! Turns the names typed into a draft back into the backend's ids before a save.
use chrono::NaiveTime;
use futures::try_join;
use log::{debug, info, warn};

use super::{
    api::{ApiClient, EntryLinks},
    error::ApiError,
    gateway::Transport,
    models::schedule_model::{strip_parens, ScheduleDraft, ScheduleEntry, SessionType, Subgroup, Subject, Teacher},
    session::SessionStore,
};

/// A trait, necessary for every entity that can answer reference lookups during a save.
#[allow(async_fn_in_trait)]
pub trait ReferenceSource {
    async fn teachers(&self) -> Result<Vec<Teacher>, ApiError>;
    async fn subjects(&self) -> Result<Vec<Subject>, ApiError>;
    async fn subgroups(&self) -> Result<Vec<Subgroup>, ApiError>;
    async fn subgroups_of_group(&self, group_number: &str) -> Result<Vec<Subgroup>, ApiError>;
}

/// A trait, necessary for every entity that persists schedule entries.
#[allow(async_fn_in_trait)]
pub trait ScheduleWriter {
    async fn create_entry(&self, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError>;
    async fn update_entry(&self, id: u64, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError>;
}

impl<T: Transport, S: SessionStore> ReferenceSource for ApiClient<T, S> {
    async fn teachers(&self) -> Result<Vec<Teacher>, ApiError> {
        self.all_teachers().await
    }

    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.all_subjects().await
    }

    async fn subgroups(&self) -> Result<Vec<Subgroup>, ApiError> {
        self.all_subgroups().await
    }

    async fn subgroups_of_group(&self, group_number: &str) -> Result<Vec<Subgroup>, ApiError> {
        self.subgroups_by_group_number(group_number).await
    }
}

impl<T: Transport, S: SessionStore> ScheduleWriter for ApiClient<T, S> {
    async fn create_entry(&self, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        self.create_schedule(draft, links).await
    }

    async fn update_entry(&self, id: u64, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        self.update_schedule(id, draft, links).await
    }
}

/// Ids a draft resolved to. More than one subgroup id means the draft
/// targets a whole group and is saved once per subgroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub teacher_id: u64,
    pub subject_id: u64,
    pub subgroup_ids: Vec<u64>,
}

/// Checks what can be checked without the backend.
pub fn validate_draft(draft: &ScheduleDraft) -> Result<(), ApiError> {
    let required = [
        &draft.subject,
        &draft.teacher,
        &draft.classroom,
        &draft.time_start,
        &draft.time_end,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::Validation(
            "Please fill in all required fields".to_owned(),
        ));
    }
    if draft.subgroup.trim().is_empty() {
        return Err(ApiError::Validation("Choose a group or subgroup".to_owned()));
    }
    let start = parse_time(&draft.time_start)?;
    let end = parse_time(&draft.time_end)?;
    if start >= end {
        return Err(ApiError::Validation(
            "Start time must be earlier than end time".to_owned(),
        ));
    }
    Ok(())
}

fn parse_time(time: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| ApiError::Validation(format!("Invalid time {}, expected HH:MM", time)))
}

pub fn find_teacher(teachers: &[Teacher], name: &str) -> Option<u64> {
    teachers
        .iter()
        .find(|teacher| teacher.name == name)
        .map(|teacher| teacher.id)
}

/// A subject with the same name whose stored type is the draft's type. A
/// type label merely containing it (`ЛАБ` contains `Л`) is taken only when
/// nothing matches exactly.
pub fn find_subject(subjects: &[Subject], name: &str, session_type: SessionType) -> Option<u64> {
    let label = session_type.label();
    let named = || subjects.iter().filter(|subject| subject.name == name);
    named()
        .find(|subject| strip_parens(&subject.kind).trim() == label)
        .or_else(|| named().find(|subject| subject.kind.contains(label)))
        .map(|subject| subject.id)
}

/// Last-resort scan: subgroup number equal to the label, owning group
/// number equal to it, or subgroup number starting with `"{label}-"`.
pub fn scan_subgroups(subgroups: &[Subgroup], label: &str) -> Vec<u64> {
    let prefix = format!("{}-", label);
    subgroups
        .iter()
        .filter(|subgroup| {
            subgroup.number == label
                || subgroup.group_number.as_deref() == Some(label)
                || subgroup.number.starts_with(&prefix)
        })
        .map(|subgroup| subgroup.id)
        .filter(|id| *id != 0)
        .collect()
}

/// Subgroup ids for a subgroup-or-group label, trying in order: an exact
/// subgroup, every subgroup of a group with that number, a full scan.
pub async fn resolve_subgroups<R: ReferenceSource>(
    source: &R,
    subgroups: &[Subgroup],
    label: &str,
) -> Vec<u64> {
    if let Some(subgroup) = subgroups.iter().find(|subgroup| subgroup.number == label) {
        debug!("{} is subgroup {}", label, subgroup.id);
        return vec![subgroup.id];
    }

    match source.subgroups_of_group(label).await {
        Ok(of_group) if !of_group.is_empty() => {
            let ids = of_group
                .iter()
                .map(|subgroup| subgroup.id)
                .filter(|id| *id != 0)
                .collect::<Vec<_>>();
            if !ids.is_empty() {
                debug!("{} is a group with subgroups {:?}", label, ids);
                return ids;
            }
        }
        Ok(_) => {}
        Err(err) => warn!("Could not look up subgroups of group {}: {}", label, err),
    }

    let ids = scan_subgroups(subgroups, label);
    if !ids.is_empty() {
        debug!("Full scan matched {} to subgroups {:?}", label, ids);
    }
    ids
}

/// Resolves every name in the draft, failing with
/// [`ApiError::UnresolvedReference`] when any of them is unknown.
pub async fn resolve_draft<R: ReferenceSource>(draft: &ScheduleDraft, source: &R) -> Result<Resolved, ApiError> {
    let (teachers, subjects, subgroups) =
        try_join!(source.teachers(), source.subjects(), source.subgroups())?;

    let teacher_id = find_teacher(&teachers, &draft.teacher);
    let subject_id = find_subject(&subjects, &draft.subject, draft.session_type);
    let subgroup_ids = resolve_subgroups(source, &subgroups, draft.subgroup.trim()).await;
    debug!(
        "Resolved teacher {:?}, subject {:?}, subgroups {:?}",
        teacher_id, subject_id, subgroup_ids
    );

    match (teacher_id, subject_id) {
        (Some(teacher_id), Some(subject_id)) if !subgroup_ids.is_empty() => Ok(Resolved {
            teacher_id,
            subject_id,
            subgroup_ids,
        }),
        _ => Err(ApiError::UnresolvedReference {
            teacher_id,
            subject_id,
            subgroup_ids,
        }),
    }
}

/// Validates and resolves the draft, then creates it (or updates entry
/// `existing_id`) once per resolved subgroup. Nothing is sent to the backend
/// unless every reference resolved. A conflict reported by the backend comes
/// back as [`ApiError::Conflict`]; the draft itself is never touched.
pub async fn save_draft<R>(api: &R, draft: &ScheduleDraft, existing_id: Option<u64>) -> Result<Vec<ScheduleEntry>, ApiError>
where
    R: ReferenceSource + ScheduleWriter,
{
    validate_draft(draft)?;
    let resolved = resolve_draft(draft, api).await?;

    let mut saved = Vec::with_capacity(resolved.subgroup_ids.len());
    for subgroup_id in resolved.subgroup_ids {
        let links = EntryLinks {
            subgroup_id,
            teacher_id: resolved.teacher_id,
            subject_id: resolved.subject_id,
        };
        let entry = match existing_id {
            Some(id) => api.update_entry(id, draft, links).await?,
            None => api.create_entry(draft, links).await?,
        };
        info!(
            "Saved entry {} for subgroup {}",
            entry.id,
            entry.subgroup.as_deref().unwrap_or("-")
        );
        saved.push(entry);
    }
    Ok(saved)
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
