use std::{
    error::Error,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use futures::try_join;
use log::{info, warn};

use super::{
    api::ApiClient,
    error::ApiError,
    favorites::Favorites,
    gateway::Transport,
    grouping::{available_subgroups, schedule_for_entity, visible_schedule},
    loader::load_reference_data,
    models::{
        dto_model::{
            CreateAdminRequest, NewGroupRequest, NewSubjectRequest, NewTeacherRequest,
            RegisterRequest, UpdateUserRequest,
        },
        schedule_model::{EntityKind, Group, ScheduleDraft, SelectedEntity, Subject, Teacher, User},
        Args, Command, EntityArgs, EntryCommand, FacultyCommand, FavoritesCommand, GroupCommand,
        SubgroupCommand, SubjectCommand, TeacherCommand, UserCommand, ViewArgs,
    },
    parity::today,
    reconcile::save_draft,
    render::{describe, render},
    session::SessionStore,
};

/// Performs the command from `args` against the backend, writing what the
/// user should see to `out`.
pub async fn run<T: Transport, S: SessionStore, W: Write>(
    api: &ApiClient<T, S>,
    args: &Args,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    match &args.command {
        Command::Login { email, password } => {
            api.authenticate(email, password).await?;
            match api.current_user().await? {
                Some(user) => writeln!(out, "Signed in as {}", user_line(&user))?,
                None => writeln!(out, "Signed in as {}", email)?,
            }
        }
        Command::Register(registration) => {
            api.register(&RegisterRequest {
                first_name: registration.first_name.clone(),
                last_name: registration.last_name.clone(),
                middle_name: registration.middle_name.clone(),
                email: registration.email.clone(),
                password: registration.password.clone(),
                group_number: registration.group_number.clone(),
                subgroup_number: registration.subgroup_number.clone(),
                info: registration.info.clone(),
            })
            .await?;
            writeln!(out, "Registered {}", registration.email)?;
        }
        Command::Logout => {
            api.logout()?;
            writeln!(out, "Signed out")?;
        }
        Command::Whoami => match api.current_user().await? {
            Some(user) => writeln!(out, "{}", user_line(&user))?,
            None => writeln!(out, "Not signed in")?,
        },
        Command::Search { query } => {
            let (groups, teachers) = try_join!(api.search_groups(query), api.search_teachers(query))?;
            if groups.is_empty() && teachers.is_empty() {
                writeln!(out, "Nothing found for {}", query)?;
            }
            for group in groups {
                writeln!(out, "group\t{}\t{}", group.id, group.number)?;
            }
            for teacher in teachers {
                writeln!(out, "teacher\t{}\t{}", teacher.id, teacher.name)?;
            }
        }
        Command::View(view) => view_schedule(api, view, out).await?,
        Command::Favorites { action } => {
            run_favorites(api, &args.favorites_json_path, action, out).await?
        }
        Command::Entry { action } => run_entry(api, action, out).await?,
        Command::Group { action } => run_group(api, action, out).await?,
        Command::Subgroup { action } => run_subgroup(api, action, out).await?,
        Command::Teacher { action } => run_teacher(api, action, out).await?,
        Command::Subject { action } => run_subject(api, action, out).await?,
        Command::Faculty { action } => match action {
            FacultyCommand::List => {
                for faculty in api.all_faculties().await? {
                    writeln!(out, "{}\t{}\t{}", faculty.id, faculty.abbreviation, faculty.name)?;
                }
            }
            FacultyCommand::Delete { id } => {
                api.delete_faculty(*id).await?;
                writeln!(out, "Deleted faculty {}", id)?;
            }
        },
        Command::User { action } => run_user(api, action, out).await?,
        Command::Overview => {
            let data = load_reference_data(api, true).await?;
            writeln!(out, "Groups: {}", data.groups.len())?;
            writeln!(out, "Subgroups: {}", data.subgroups.len())?;
            writeln!(out, "Teachers: {}", data.teachers.len())?;
            writeln!(out, "Subjects: {}", data.subjects.len())?;
            writeln!(out, "Faculties: {}", data.faculties.len())?;
            writeln!(out, "Schedule entries: {}", data.schedules.len())?;
            writeln!(out, "Users: {}", data.users.len())?;
        }
        Command::Import { files } => {
            api.import_excel(files.as_slice()).await?;
            writeln!(out, "Imported {} file(s)", files.len())?;
        }
        Command::ExportPdf { group, output } => {
            let bytes = api.export_pdf(group).await?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("schedule_{}.pdf", group)));
            std::fs::write(&path, bytes)?;
            writeln!(out, "Saved {}", path.display())?;
        }
    }
    Ok(())
}

fn entity_choice(entity: &EntityArgs) -> Result<(EntityKind, &str), ApiError> {
    match (&entity.group, &entity.teacher) {
        (Some(group), _) => Ok((EntityKind::Group, group.as_str())),
        (None, Some(teacher)) => Ok((EntityKind::Teacher, teacher.as_str())),
        (None, None) => Err(ApiError::Validation(
            "Choose a group or a teacher".to_owned(),
        )),
    }
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Group => "group",
        EntityKind::Teacher => "teacher",
    }
}

fn user_line(user: &User) -> String {
    format!(
        "{}\t{} {}\t{}\t{}",
        user.id,
        user.last_name,
        user.first_name,
        user.email,
        user.role.map(|role| role.wire()).unwrap_or("-")
    )
}

/// Looks a group up by its exact number or a teacher by exact name.
async fn find_entity<T, S>(api: &ApiClient<T, S>, entity: &EntityArgs) -> Result<SelectedEntity, ApiError>
where
    T: Transport,
    S: SessionStore,
{
    let (kind, name) = entity_choice(entity)?;
    let id = match kind {
        EntityKind::Group => api
            .search_groups(name)
            .await?
            .into_iter()
            .find(|group| group.number == name)
            .map(|group| group.id),
        EntityKind::Teacher => api
            .search_teachers(name)
            .await?
            .into_iter()
            .find(|teacher| teacher.name == name)
            .map(|teacher| teacher.id),
    };
    id.map(|id| SelectedEntity {
        id,
        name: name.to_owned(),
        kind,
    })
    .ok_or_else(|| ApiError::Validation(format!("No {} {}", kind_name(kind), name)))
}

async fn view_schedule<T, S, W>(api: &ApiClient<T, S>, view: &ViewArgs, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    let (kind, name) = entity_choice(&view.entity)?;
    let all = match api.all_schedules().await {
        Ok(all) => all,
        Err(err) if kind == EntityKind::Group => {
            warn!("Could not get the full schedule ({}), asking for group {} only", err, name);
            api.schedule_by_subgroup(name).await?
        }
        Err(err) => return Err(err.into()),
    };
    let owned = schedule_for_entity(&all, kind, name);
    info!("Found {} entries for {} {}", owned.len(), kind_name(kind), name);

    if kind == EntityKind::Group {
        let labels = available_subgroups(&owned, name);
        if !labels.is_empty() {
            writeln!(out, "Подгруппы: {}", labels.join(", "))?;
        }
    }
    let shown = visible_schedule(&owned, kind, name, &view.subgroups);
    let date = view.date.unwrap_or_else(today);
    writeln!(out, "{}", render(&shown, date, view.mode))?;
    Ok(())
}

async fn run_favorites<T, S, W>(
    api: &ApiClient<T, S>,
    path: &Path,
    action: &FavoritesCommand,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    let mut favorites = Favorites::load(path.to_path_buf());
    match action {
        FavoritesCommand::List => {
            if favorites.items().is_empty() {
                writeln!(out, "No favorites yet")?;
            }
            for item in favorites.items() {
                writeln!(out, "{}\t{}\t{}", kind_name(item.kind), item.id, item.name)?;
            }
        }
        FavoritesCommand::Add(entity) => {
            let selected = find_entity(api, entity).await?;
            if favorites.contains(selected.id, selected.kind) {
                writeln!(out, "{} is already a favorite", selected.name)?;
            } else {
                let name = selected.name.clone();
                favorites.toggle(selected)?;
                writeln!(out, "Added {} to favorites", name)?;
            }
        }
        FavoritesCommand::Remove(entity) => {
            let (kind, name) = entity_choice(entity)?;
            let found = favorites
                .items()
                .iter()
                .find(|item| item.kind == kind && item.name == name)
                .map(|item| item.id);
            match found {
                Some(id) => {
                    favorites.remove(id, kind)?;
                    writeln!(out, "Removed {} from favorites", name)?;
                }
                None => writeln!(out, "{} is not a favorite", name)?,
            }
        }
    }
    Ok(())
}

async fn run_entry<T, S, W>(api: &ApiClient<T, S>, action: &EntryCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        EntryCommand::Show { id } => {
            let entry = api
                .all_schedules()
                .await?
                .into_iter()
                .find(|entry| entry.id == *id)
                .ok_or_else(|| ApiError::Validation(format!("No schedule entry {}", id)))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&ScheduleDraft::from(&entry))?)?;
        }
        EntryCommand::Template { group, output } => {
            let draft = ScheduleDraft {
                subgroup: group.clone().unwrap_or_default(),
                ..ScheduleDraft::default()
            };
            serde_json::to_writer_pretty(File::create(output)?, &draft)?;
            writeln!(out, "Wrote {}", output.display())?;
        }
        EntryCommand::Save { draft, id } => {
            let input: ScheduleDraft = serde_json::from_reader(BufReader::new(File::open(draft)?))?;
            match save_draft(api, &input, *id).await {
                Ok(saved) => {
                    for entry in saved {
                        writeln!(out, "Saved {}", describe(&entry))?;
                    }
                }
                Err(ApiError::Conflict(conflict)) => {
                    writeln!(out, "Clashes with entry {}: {}", conflict.existing.id, describe(&conflict.existing))?;
                    writeln!(
                        out,
                        "Inspect it with `entry show {}`; {} was left as is",
                        conflict.existing.id,
                        draft.display()
                    )?;
                    return Err(ApiError::Conflict(conflict).into());
                }
                Err(err) => return Err(err.into()),
            }
        }
        EntryCommand::Delete { id } => {
            api.delete_schedule(*id).await?;
            writeln!(out, "Deleted entry {}", id)?;
        }
    }
    Ok(())
}

async fn run_group<T, S, W>(api: &ApiClient<T, S>, action: &GroupCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        GroupCommand::List => {
            for group in api.all_groups().await? {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\tfaculty {}",
                    group.id, group.number, group.direction, group.profile, group.faculty_id
                )?;
            }
        }
        GroupCommand::Add {
            number,
            direction,
            profile,
            faculty_id,
        } => {
            let group = api
                .create_group(&NewGroupRequest {
                    number: number.clone(),
                    direction: direction.clone(),
                    profile: profile.clone(),
                    faculty_id: *faculty_id,
                })
                .await?;
            writeln!(out, "Created group {} ({})", group.number, group.id)?;
        }
        GroupCommand::Update {
            id,
            number,
            direction,
            profile,
        } => {
            let group = api
                .update_group(&Group {
                    id: *id,
                    number: number.clone(),
                    direction: direction.clone(),
                    profile: profile.clone(),
                    faculty_id: 0,
                })
                .await?;
            writeln!(out, "Updated group {} ({})", group.number, group.id)?;
        }
        GroupCommand::Delete { id } => {
            api.delete_group(*id).await?;
            writeln!(out, "Deleted group {}", id)?;
        }
    }
    Ok(())
}

async fn run_subgroup<T, S, W>(api: &ApiClient<T, S>, action: &SubgroupCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        SubgroupCommand::List { group } => {
            let subgroups = match group {
                Some(group) => api.subgroups_by_group_number(group).await?,
                None => api.all_subgroups().await?,
            };
            for subgroup in subgroups {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    subgroup.id,
                    subgroup.number,
                    subgroup.group_number.as_deref().unwrap_or("-")
                )?;
            }
        }
        SubgroupCommand::Add {
            group_number,
            number,
            size,
        } => {
            let subgroup = api.create_subgroup(group_number, number, *size).await?;
            writeln!(out, "Created subgroup {} ({})", subgroup.number, subgroup.id)?;
        }
        SubgroupCommand::Update {
            id,
            group_number,
            number,
            size,
        } => {
            let subgroup = api.update_subgroup(*id, group_number, number, *size).await?;
            writeln!(out, "Updated subgroup {} ({})", subgroup.number, subgroup.id)?;
        }
        SubgroupCommand::Delete { id } => {
            api.delete_subgroup(*id).await?;
            writeln!(out, "Deleted subgroup {}", id)?;
        }
    }
    Ok(())
}

async fn run_teacher<T, S, W>(api: &ApiClient<T, S>, action: &TeacherCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        TeacherCommand::List => {
            for teacher in api.all_teachers().await? {
                writeln!(out, "{}\t{}\t{}", teacher.id, teacher.name, teacher.post)?;
            }
        }
        TeacherCommand::Add {
            name,
            post,
            faculty_id,
        } => {
            let teacher = api
                .create_teacher(&NewTeacherRequest {
                    name: name.clone(),
                    post: post.clone(),
                    faculty_id: *faculty_id,
                })
                .await?;
            writeln!(out, "Created teacher {} ({})", teacher.name, teacher.id)?;
        }
        TeacherCommand::Update { id, name, post } => {
            let teacher = api
                .update_teacher(&Teacher {
                    id: *id,
                    name: name.clone(),
                    post: post.clone(),
                    faculty_id: 0,
                })
                .await?;
            writeln!(out, "Updated teacher {} ({})", teacher.name, teacher.id)?;
        }
        TeacherCommand::Delete { id } => {
            api.delete_teacher(*id).await?;
            writeln!(out, "Deleted teacher {}", id)?;
        }
    }
    Ok(())
}

async fn run_subject<T, S, W>(api: &ApiClient<T, S>, action: &SubjectCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        SubjectCommand::List => {
            for subject in api.all_subjects().await? {
                writeln!(out, "{}\t{}\t{}", subject.id, subject.name, subject.kind)?;
            }
        }
        SubjectCommand::Add { name, kind } => {
            let subject = api
                .create_subject(&NewSubjectRequest {
                    name: name.clone(),
                    kind: kind.clone(),
                })
                .await?;
            writeln!(out, "Created subject {} ({})", subject.name, subject.id)?;
        }
        SubjectCommand::Update { id, name, kind } => {
            let subject = api
                .update_subject(&Subject {
                    id: *id,
                    name: name.clone(),
                    kind: kind.clone(),
                })
                .await?;
            writeln!(out, "Updated subject {} ({})", subject.name, subject.id)?;
        }
        SubjectCommand::Delete { id } => {
            api.delete_subject(*id).await?;
            writeln!(out, "Deleted subject {}", id)?;
        }
    }
    Ok(())
}

async fn run_user<T, S, W>(api: &ApiClient<T, S>, action: &UserCommand, out: &mut W) -> Result<(), Box<dyn Error>>
where
    T: Transport,
    S: SessionStore,
    W: Write,
{
    match action {
        UserCommand::List => {
            for user in api.all_users().await? {
                writeln!(out, "{}", user_line(&user))?;
            }
        }
        UserCommand::Role {
            id,
            role,
            faculty_id,
        } => {
            let user = api.update_user_role(*id, *role, *faculty_id).await?;
            writeln!(out, "{}", user_line(&user))?;
        }
        UserCommand::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
            middle_name,
            role,
            faculty_id,
        } => {
            let user = api
                .create_admin(&CreateAdminRequest {
                    email: email.clone(),
                    password: password.clone(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    middle_name: middle_name.clone(),
                    role: *role,
                    faculty_id: *faculty_id,
                })
                .await?;
            writeln!(out, "Created {}", user_line(&user))?;
        }
        UserCommand::Update {
            id,
            first_name,
            last_name,
            middle_name,
            email,
            role,
            faculty_id,
            group_number,
            subgroup_number,
        } => {
            let user = api
                .update_user(
                    *id,
                    &UpdateUserRequest {
                        first_name: first_name.clone(),
                        last_name: last_name.clone(),
                        middle_name: middle_name.clone(),
                        email: email.clone(),
                        role: *role,
                        faculty_id: *faculty_id,
                        group_number: group_number.clone(),
                        subgroup_number: subgroup_number.clone(),
                    },
                )
                .await?;
            writeln!(out, "Updated {}", user_line(&user))?;
        }
        UserCommand::Delete { id } => {
            api.delete_user(*id).await?;
            writeln!(out, "Deleted user {}", id)?;
        }
    }
    Ok(())
}
