use std::{collections::HashMap, sync::Mutex};

use crate::hub::{
    error::ScheduleConflict,
    models::schedule_model::{DayOfWeek, Parity},
};

use super::*;

#[derive(Default)]
struct FakeBackend {
    teachers: Vec<Teacher>,
    subjects: Vec<Subject>,
    subgroups: Vec<Subgroup>,
    by_group: HashMap<String, Vec<Subgroup>>,
    group_lookup_fails: bool,
    conflict_on_subgroup: Option<u64>,
    writes: Mutex<Vec<(Option<u64>, EntryLinks)>>,
}

impl ReferenceSource for FakeBackend {
    async fn teachers(&self) -> Result<Vec<Teacher>, ApiError> {
        Ok(self.teachers.clone())
    }

    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        Ok(self.subjects.clone())
    }

    async fn subgroups(&self) -> Result<Vec<Subgroup>, ApiError> {
        Ok(self.subgroups.clone())
    }

    async fn subgroups_of_group(&self, group_number: &str) -> Result<Vec<Subgroup>, ApiError> {
        if self.group_lookup_fails {
            return Err(ApiError::Status {
                status: 404,
                message: "Group not found".to_string(),
            });
        }
        Ok(self.by_group.get(group_number).cloned().unwrap_or_default())
    }
}

impl FakeBackend {
    fn record(&self, id: Option<u64>, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        self.writes.lock().unwrap().push((id, links));
        let subgroup = self
            .subgroups
            .iter()
            .find(|subgroup| subgroup.id == links.subgroup_id)
            .map(|subgroup| subgroup.number.clone());
        let entry = ScheduleEntry {
            id: id.unwrap_or(100 + links.subgroup_id),
            subject: draft.subject.clone(),
            session_type: draft.session_type,
            teacher: draft.teacher.clone(),
            classroom: draft.classroom.clone(),
            time_start: draft.time_start.clone(),
            time_end: draft.time_end.clone(),
            day: draft.day,
            parity: draft.parity,
            subgroup,
        };
        if self.conflict_on_subgroup == Some(links.subgroup_id) {
            return Err(ApiError::Conflict(Box::new(ScheduleConflict {
                message: "Classroom 301 is taken".to_string(),
                existing: ScheduleEntry { id: 77, ..entry },
            })));
        }
        Ok(entry)
    }

    fn writes(&self) -> Vec<(Option<u64>, EntryLinks)> {
        self.writes.lock().unwrap().clone()
    }
}

impl ScheduleWriter for FakeBackend {
    async fn create_entry(&self, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        self.record(None, draft, links)
    }

    async fn update_entry(&self, id: u64, draft: &ScheduleDraft, links: EntryLinks) -> Result<ScheduleEntry, ApiError> {
        self.record(Some(id), draft, links)
    }
}

fn subgroup(id: u64, number: &str, group: Option<&str>) -> Subgroup {
    Subgroup {
        id,
        number: number.to_string(),
        group_id: group.map(|_| 1),
        group_number: group.map(str::to_string),
    }
}

fn backend() -> FakeBackend {
    let subgroups = vec![
        subgroup(11, "121-1", Some("121")),
        subgroup(12, "121-2", Some("121")),
        subgroup(21, "122-1", Some("122")),
    ];
    FakeBackend {
        teachers: vec![Teacher {
            id: 3,
            name: "Петров П.П.".to_string(),
            post: "доцент".to_string(),
            faculty_id: 1,
        }],
        subjects: vec![
            Subject {
                id: 8,
                name: "Физика".to_string(),
                kind: "(ЛАБ)".to_string(),
            },
            Subject {
                id: 9,
                name: "Физика".to_string(),
                kind: "(Л)".to_string(),
            },
        ],
        by_group: HashMap::from([("121".to_string(), subgroups[..2].to_vec())]),
        subgroups,
        ..FakeBackend::default()
    }
}

fn draft(subgroup: &str) -> ScheduleDraft {
    ScheduleDraft {
        subject: "Физика".to_string(),
        session_type: SessionType::Lecture,
        teacher: "Петров П.П.".to_string(),
        classroom: "301".to_string(),
        time_start: "09:40".to_string(),
        time_end: "11:10".to_string(),
        day: DayOfWeek::Tuesday,
        parity: Parity::Numerator,
        subgroup: subgroup.to_string(),
    }
}

#[test]
fn validation_requires_fields_and_ordered_times() {
    assert!(validate_draft(&draft("121-1")).is_ok());

    let missing = ScheduleDraft {
        teacher: " ".to_string(),
        ..draft("121-1")
    };
    assert!(matches!(validate_draft(&missing), Err(ApiError::Validation(_))));

    assert!(matches!(
        validate_draft(&draft("")),
        Err(ApiError::Validation(_))
    ));

    let reversed = ScheduleDraft {
        time_start: "11:10".to_string(),
        time_end: "09:40".to_string(),
        ..draft("121-1")
    };
    assert!(matches!(validate_draft(&reversed), Err(ApiError::Validation(_))));

    let garbled = ScheduleDraft {
        time_start: "9.40".to_string(),
        ..draft("121-1")
    };
    assert!(matches!(validate_draft(&garbled), Err(ApiError::Validation(_))));
}

#[test]
fn subject_prefers_exact_type_over_containing_one() {
    let subjects = backend().subjects;
    assert_eq!(find_subject(&subjects, "Физика", SessionType::Lecture), Some(9));
    assert_eq!(find_subject(&subjects, "Физика", SessionType::Lab), Some(8));
    assert_eq!(find_subject(&subjects, "Физика", SessionType::Practice), None);
    assert_eq!(find_subject(&subjects, "Химия", SessionType::Lecture), None);
}

#[test]
fn scan_matches_number_group_or_prefix() {
    let subgroups = vec![
        subgroup(1, "130", None),
        subgroup(2, "131-1", None),
        subgroup(3, "x", Some("131")),
        subgroup(4, "1311-1", None),
    ];
    assert_eq!(scan_subgroups(&subgroups, "130"), vec![1]);
    assert_eq!(scan_subgroups(&subgroups, "131"), vec![2, 3]);
    assert!(scan_subgroups(&subgroups, "999").is_empty());
}

#[tokio::test]
async fn exact_subgroup_resolves_to_itself() {
    let backend = backend();
    let resolved = resolve_draft(&draft("121-2"), &backend).await.unwrap();
    assert_eq!(
        resolved,
        Resolved {
            teacher_id: 3,
            subject_id: 9,
            subgroup_ids: vec![12],
        }
    );
}

#[tokio::test]
async fn group_label_expands_to_its_subgroups() {
    let backend = backend();
    let resolved = resolve_draft(&draft("121"), &backend).await.unwrap();
    assert_eq!(resolved.subgroup_ids, vec![11, 12]);
}

#[tokio::test]
async fn failed_group_lookup_falls_back_to_scan() {
    let backend = FakeBackend {
        group_lookup_fails: true,
        ..backend()
    };
    let resolved = resolve_draft(&draft("122"), &backend).await.unwrap();
    assert_eq!(resolved.subgroup_ids, vec![21]);
}

#[tokio::test]
async fn save_fans_out_once_per_subgroup() {
    let backend = backend();

    let saved = save_draft(&backend, &draft("121"), None).await.unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].subgroup.as_deref(), Some("121-1"));
    assert_eq!(saved[1].subgroup.as_deref(), Some("121-2"));
    let linked = backend
        .writes()
        .into_iter()
        .map(|(id, links)| (id, links.subgroup_id, links.teacher_id, links.subject_id))
        .collect::<Vec<_>>();
    assert_eq!(linked, vec![(None, 11, 3, 9), (None, 12, 3, 9)]);
}

#[tokio::test]
async fn update_targets_the_existing_entry() {
    let backend = backend();

    let saved = save_draft(&backend, &draft("121-1"), Some(42)).await.unwrap();

    assert_eq!(saved[0].id, 42);
    assert_eq!(backend.writes().len(), 1);
    assert_eq!(backend.writes()[0].0, Some(42));
}

#[tokio::test]
async fn unresolved_reference_writes_nothing() {
    let backend = backend();
    let unknown = ScheduleDraft {
        teacher: "Иванов И.И.".to_string(),
        ..draft("999")
    };

    let err = save_draft(&backend, &unknown, None).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::UnresolvedReference {
            teacher_id: None,
            subject_id: Some(9),
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Could not resolve related data: teacher(null), subject(9), subgroup/group(null)"
    );
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn conflict_stops_the_fan_out() {
    let backend = FakeBackend {
        conflict_on_subgroup: Some(11),
        ..backend()
    };
    let input = draft("121");

    let err = save_draft(&backend, &input, None).await.unwrap_err();

    let ApiError::Conflict(conflict) = err else {
        panic!("expected a conflict");
    };
    assert_eq!(conflict.existing.id, 77);
    assert_eq!(conflict.existing.subgroup.as_deref(), Some("121-1"));
    assert_eq!(backend.writes().len(), 1);
    assert_eq!(input, draft("121"));
}
