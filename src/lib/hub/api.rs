use std::path::Path;

use log::{debug, info};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{
    error::{ApiError, ScheduleConflict},
    gateway::{ApiRequest, ApiResponse, FilePart, Gateway, Transport},
    models::{
        dto_model::{
            map_faculty_dto, map_group_dto, map_schedule_dto, map_subgroup_dto, map_subject_dto,
            map_teacher_dto, AuthResponse, AuthenticateRequest, ConflictResponse,
            CreateAdminRequest, ErrorBody, GroupDto, GroupNumberRef, NewGroupRequest,
            NewSubjectRequest, NewTeacherRequest, RegisterRequest, ScheduleDto, SubgroupDto,
            SubgroupRequest, SubjectDto, TeacherDto, UpdateUserRequest,
        },
        schedule_model::{
            Faculty, Group, ScheduleDraft, ScheduleEntry, Subgroup, Subject, Teacher, User,
            UserRole,
        },
    },
    session::SessionStore,
};

const MAX_ERROR_TEXT: usize = 200;

/// Foreign keys a schedule entry is saved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLinks {
    pub subgroup_id: u64,
    pub teacher_id: u64,
    pub subject_id: u64,
}

/// Typed operations of the schedule backend.
pub struct ApiClient<T, S> {
    gateway: Gateway<T, S>,
}

impl<T: Transport, S: SessionStore> ApiClient<T, S> {
    pub fn new(transport: T, session: S, base_url: impl Into<String>) -> Self {
        ApiClient {
            gateway: Gateway::new(transport, session, base_url),
        }
    }

    pub fn gateway(&self) -> &Gateway<T, S> {
        &self.gateway
    }

    /* Authentication */

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(), ApiError> {
        info!("Signing in as {}", email);
        let request = ApiRequest::post(self.gateway.url("auth/authenticate"))
            .json(&AuthenticateRequest { email, password })?;
        let tokens: AuthResponse = expect_json(self.gateway.fetch(&request).await?)?;
        let access = tokens.access().ok_or_else(|| ApiError::Status {
            status: StatusCode::OK.as_u16(),
            message: "Authentication answer carries no access token".to_owned(),
        })?;
        self.gateway
            .store_tokens(Some(access), tokens.refresh_token.as_deref());
        Ok(())
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<(), ApiError> {
        info!("Registering {}", registration.email);
        let request = ApiRequest::post(self.gateway.url("auth/register")).json(registration)?;
        let tokens: Option<AuthResponse> = parse_json(self.gateway.fetch(&request).await?)?;
        if let Some(access) = tokens.as_ref().and_then(AuthResponse::access) {
            self.gateway.store_tokens(
                Some(access),
                tokens.as_ref().and_then(|tokens| tokens.refresh_token.as_deref()),
            );
        }
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        Ok(self.gateway.session().clear()?)
    }

    /* Schedule */

    pub async fn all_schedules(&self) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.get_list("schedule", map_schedule_dto).await
    }

    pub async fn schedule_by_subgroup(&self, subgroup_number: &str) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.get_list(
            &format!("schedule/subgroup/number/{}", subgroup_number),
            map_schedule_dto,
        )
        .await
    }

    pub async fn create_schedule(&self, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        let request = ApiRequest::post(self.gateway.url("schedule")).query(schedule_params(draft, links));
        let dto: ScheduleDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_schedule_dto(dto))
    }

    pub async fn update_schedule(
        &self,
        id: u64,
        draft: &ScheduleDraft,
        links: EntryLinks,
    ) -> Result<ScheduleEntry, ApiError> {
        let request = ApiRequest::put(self.gateway.url(&format!("schedule/{}", id)))
            .query(schedule_params(draft, links));
        let dto: ScheduleDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_schedule_dto(dto))
    }

    pub async fn delete_schedule(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("schedule/{}", id)).await
    }

    pub async fn export_pdf(&self, group_number: &str) -> Result<Vec<u8>, ApiError> {
        info!("Exporting schedule of {} as PDF", group_number);
        let request = ApiRequest::get(
            self.gateway
                .url(&format!("schedule/export/pdf/{}", group_number)),
        );
        let response = self.gateway.fetch(&request).await?;
        if !response.status.is_success() {
            return Err(ApiError::Status {
                status: response.status.as_u16(),
                message: format!(
                    "PDF export failed: {}",
                    response.status.canonical_reason().unwrap_or("unknown error")
                ),
            });
        }
        Ok(response.body)
    }

    pub async fn import_excel(&self, files: &[impl AsRef<Path>]) -> Result<(), ApiError> {
        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let path = file.as_ref();
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "schedule.xlsx".to_owned());
            info!("Importing {} ({} bytes)", path.display(), bytes.len());
            parts.push(FilePart {
                field: "files".to_owned(),
                file_name,
                bytes,
            });
        }
        let request = ApiRequest::post(self.gateway.url("import/import-excel")).multipart(parts);
        // a successful import may answer without any body
        check(self.gateway.auth_fetch(&request).await?)?;
        Ok(())
    }

    /* Groups */

    pub async fn all_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get_list("batches", map_group_dto).await
    }

    pub async fn search_groups(&self, query: &str) -> Result<Vec<Group>, ApiError> {
        let query = query.to_lowercase();
        Ok(self
            .all_groups()
            .await?
            .into_iter()
            .filter(|group| group.number.to_lowercase().contains(&query))
            .collect())
    }

    pub async fn create_group(&self, group: &NewGroupRequest) -> Result<Group, ApiError> {
        let request = ApiRequest::post(self.gateway.url("batches")).json(group)?;
        let dto: GroupDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_group_dto(dto))
    }

    pub async fn update_group(&self, group: &Group) -> Result<Group, ApiError> {
        let request = ApiRequest::put(self.gateway.url(&format!("batches/{}", group.id))).query([
            ("number", group.number.as_str()),
            ("direction", group.direction.as_str()),
            ("profile", group.profile.as_str()),
        ]);
        let dto: GroupDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_group_dto(dto))
    }

    pub async fn delete_group(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("batches/{}", id)).await
    }

    /* Subgroups */

    pub async fn all_subgroups(&self) -> Result<Vec<Subgroup>, ApiError> {
        self.get_list("subgroup", map_subgroup_dto).await
    }

    pub async fn subgroups_by_group_number(&self, group_number: &str) -> Result<Vec<Subgroup>, ApiError> {
        self.get_list(
            &format!("subgroup/groupNumber/{}", group_number),
            map_subgroup_dto,
        )
        .await
    }

    pub async fn create_subgroup(&self, group_number: &str, number: &str, size: u32) -> Result<Subgroup, ApiError> {
        let body = SubgroupRequest {
            id: None,
            number: number.to_owned(),
            group_dto: GroupNumberRef {
                number: group_number.to_owned(),
            },
            size,
        };
        let request = ApiRequest::post(self.gateway.url("subgroup")).json(&body)?;
        let dto: SubgroupDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_subgroup_dto(dto))
    }

    pub async fn update_subgroup(
        &self,
        id: u64,
        group_number: &str,
        number: &str,
        size: u32,
    ) -> Result<Subgroup, ApiError> {
        let body = SubgroupRequest {
            id: Some(id),
            number: number.to_owned(),
            group_dto: GroupNumberRef {
                number: group_number.to_owned(),
            },
            size,
        };
        let request = ApiRequest::put(self.gateway.url(&format!("subgroup/{}", id))).json(&body)?;
        let dto: SubgroupDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_subgroup_dto(dto))
    }

    pub async fn delete_subgroup(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("subgroup/{}", id)).await
    }

    /* Teachers */

    pub async fn all_teachers(&self) -> Result<Vec<Teacher>, ApiError> {
        self.get_list("teacher", map_teacher_dto).await
    }

    pub async fn search_teachers(&self, query: &str) -> Result<Vec<Teacher>, ApiError> {
        let query = query.to_lowercase();
        Ok(self
            .all_teachers()
            .await?
            .into_iter()
            .filter(|teacher| teacher.name.to_lowercase().contains(&query))
            .collect())
    }

    pub async fn create_teacher(&self, teacher: &NewTeacherRequest) -> Result<Teacher, ApiError> {
        let request = ApiRequest::post(self.gateway.url("teacher")).json(teacher)?;
        let dto: TeacherDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_teacher_dto(dto))
    }

    pub async fn update_teacher(&self, teacher: &Teacher) -> Result<Teacher, ApiError> {
        let request = ApiRequest::put(self.gateway.url(&format!("teacher/{}", teacher.id)))
            .query([("name", teacher.name.as_str()), ("post", teacher.post.as_str())]);
        let dto: TeacherDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_teacher_dto(dto))
    }

    pub async fn delete_teacher(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("teacher/{}", id)).await
    }

    /* Subjects */

    pub async fn all_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get_list("subject", map_subject_dto).await
    }

    pub async fn create_subject(&self, subject: &NewSubjectRequest) -> Result<Subject, ApiError> {
        let request = ApiRequest::post(self.gateway.url("subject")).json(subject)?;
        let dto: SubjectDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_subject_dto(dto))
    }

    pub async fn update_subject(&self, subject: &Subject) -> Result<Subject, ApiError> {
        let request = ApiRequest::put(self.gateway.url(&format!("subject/{}", subject.id)))
            .query([("name", subject.name.as_str()), ("type", subject.kind.as_str())]);
        let dto: SubjectDto = expect_json(self.gateway.auth_fetch(&request).await?)?;
        Ok(map_subject_dto(dto))
    }

    pub async fn delete_subject(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("subject/{}", id)).await
    }

    /* Faculties */

    pub async fn all_faculties(&self) -> Result<Vec<Faculty>, ApiError> {
        self.get_list("faculty", map_faculty_dto).await
    }

    pub async fn delete_faculty(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("faculty/delete/{}", id)).await
    }

    /* Users */

    /// The signed-in user, or `None` when the backend does not recognise the session.
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let request = ApiRequest::get(self.gateway.url("user/me"));
        let response = self.gateway.auth_fetch(&request).await?;
        if !response.status.is_success() {
            debug!("user/me answered {}", response.status);
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&response.body)?))
    }

    pub async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        let request = ApiRequest::get(self.gateway.url("admin/users"));
        expect_json(self.gateway.auth_fetch(&request).await?)
    }

    pub async fn update_user_role(&self, id: u64, role: UserRole, faculty_id: Option<u64>) -> Result<User, ApiError> {
        let mut params = vec![("role", role.wire().to_owned())];
        if let Some(faculty_id) = faculty_id {
            params.push(("facultyId", faculty_id.to_string()));
        }
        let request = ApiRequest::put(self.gateway.url(&format!("admin/users/{}/role", id))).query(params);
        expect_json(self.gateway.auth_fetch(&request).await?)
    }

    pub async fn create_admin(&self, admin: &CreateAdminRequest) -> Result<User, ApiError> {
        let request = ApiRequest::post(self.gateway.url("admin/users/admin")).json(admin)?;
        expect_json(self.gateway.auth_fetch(&request).await?)
    }

    pub async fn update_user(&self, id: u64, update: &UpdateUserRequest) -> Result<User, ApiError> {
        let request = ApiRequest::put(self.gateway.url(&format!("admin/users/{}", id))).json(update)?;
        expect_json(self.gateway.auth_fetch(&request).await?)
    }

    pub async fn delete_user(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("admin/users/{}", id)).await
    }

    async fn get_list<D, E>(&self, path: &str, map: fn(D) -> E) -> Result<Vec<E>, ApiError>
    where
        D: DeserializeOwned,
    {
        let request = ApiRequest::get(self.gateway.url(path));
        let dtos: Vec<D> = expect_json(self.gateway.fetch(&request).await?)?;
        debug!("Got {} items from {}", dtos.len(), path);
        Ok(dtos.into_iter().map(map).collect())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete(self.gateway.url(path));
        check(self.gateway.auth_fetch(&request).await?)?;
        Ok(())
    }
}

fn schedule_params(draft: &ScheduleDraft, links: EntryLinks) -> Vec<(&'static str, String)> {
    vec![
        ("parity", draft.parity.wire().to_owned()),
        ("subgroup_id", links.subgroup_id.to_string()),
        ("teacher_id", links.teacher_id.to_string()),
        ("subject_id", links.subject_id.to_string()),
        ("dayWeek", draft.day.wire().to_owned()),
        ("timeStart", draft.time_start.clone()),
        ("timeEnd", draft.time_end.clone()),
        ("classroom", draft.classroom.clone()),
    ]
}

/// Passes a 2xx response through and turns anything else into an [`ApiError`].
pub fn check(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(error_from_response(&response))
    }
}

/// Body of a successful response, or `None` when there is none to read.
pub fn parse_json<D: DeserializeOwned>(response: ApiResponse) -> Result<Option<D>, ApiError> {
    let response = check(response)?;
    if response.status == StatusCode::NO_CONTENT
        || response.body.is_empty()
        || response.content_type.is_none()
    {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&response.body)?))
}

pub fn expect_json<D: DeserializeOwned>(response: ApiResponse) -> Result<D, ApiError> {
    let status = response.status.as_u16();
    parse_json(response)?.ok_or_else(|| ApiError::Status {
        status,
        message: "The server answered without a body".to_owned(),
    })
}

pub fn error_from_response(response: &ApiResponse) -> ApiError {
    let message = error_message(response);
    match response.status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::CONFLICT if response.is_json() => {
            match serde_json::from_slice::<ConflictResponse>(&response.body) {
                Ok(ConflictResponse {
                    message: conflict_message,
                    conflict: Some(conflict),
                }) => ApiError::Conflict(Box::new(ScheduleConflict {
                    message: conflict_message.unwrap_or(message),
                    existing: map_schedule_dto(conflict),
                })),
                _ => ApiError::Status {
                    status: 409,
                    message,
                },
            }
        }
        status => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Human-readable text of a failed response: `message`, then `error` from a
/// JSON body, then the raw body, then the status line.
fn error_message(response: &ApiResponse) -> String {
    let status_line = format!(
        "HTTP {}: {}",
        response.status.as_u16(),
        response.status.canonical_reason().unwrap_or("")
    );
    let text = response.text();
    if text.trim().is_empty() {
        return status_line;
    }
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message.or(body.error).unwrap_or(status_line),
        Err(_) if text.chars().count() > MAX_ERROR_TEXT => {
            format!("{}...", text.chars().take(MAX_ERROR_TEXT).collect::<String>())
        }
        Err(_) => text,
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
