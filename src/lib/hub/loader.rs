use futures::try_join;
use log::{info, warn};

use super::{
    api::ApiClient,
    error::ApiError,
    gateway::Transport,
    models::schedule_model::{Faculty, Group, ScheduleEntry, Subgroup, Subject, Teacher, User},
    session::SessionStore,
};

/// Everything an administrator works with, fetched in one go.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReferenceData {
    pub groups: Vec<Group>,
    pub subgroups: Vec<Subgroup>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub faculties: Vec<Faculty>,
    pub schedules: Vec<ScheduleEntry>,
    pub users: Vec<User>,
}

/// Fetches the reference collections concurrently, then the user list when
/// asked for. Any failing fetch fails the whole load, except a refused user
/// list, which only leaves `users` empty.
pub async fn load_reference_data<T, S>(api: &ApiClient<T, S>, include_users: bool) -> Result<ReferenceData, ApiError>
where
    T: Transport,
    S: SessionStore,
{
    let (groups, subgroups, teachers, subjects, faculties, schedules) = try_join!(
        api.all_groups(),
        api.all_subgroups(),
        api.all_teachers(),
        api.all_subjects(),
        api.all_faculties(),
        api.all_schedules()
    )?;

    let users = if include_users {
        match api.all_users().await {
            Err(ApiError::Forbidden(message)) => {
                warn!("User list is not available to this account: {}", message);
                Vec::new()
            }
            result => result?,
        }
    } else {
        Vec::new()
    };
    info!(
        "Loaded {} groups, {} subgroups, {} teachers, {} subjects, {} faculties, {} entries, {} users",
        groups.len(),
        subgroups.len(),
        teachers.len(),
        subjects.len(),
        faculties.len(),
        schedules.len(),
        users.len()
    );

    Ok(ReferenceData {
        groups,
        subgroups,
        teachers,
        subjects,
        faculties,
        schedules,
        users,
    })
}
