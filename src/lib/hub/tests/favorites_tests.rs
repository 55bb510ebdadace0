use std::fs;

use tempfile::tempdir;

use super::*;

fn group(id: u64, name: &str) -> SelectedEntity {
    SelectedEntity {
        id,
        name: name.to_string(),
        kind: EntityKind::Group,
    }
}

#[test]
fn missing_or_broken_file_gives_empty_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    assert!(Favorites::load(path.clone()).items().is_empty());

    fs::write(&path, "not json").unwrap();
    assert!(Favorites::load(path).items().is_empty());
}

#[test]
fn toggle_adds_then_removes_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    let mut favorites = Favorites::load(path.clone());

    assert!(favorites.toggle(group(2, "121")).unwrap());
    assert!(favorites.contains(2, EntityKind::Group));
    assert!(!favorites.contains(2, EntityKind::Teacher));

    let reloaded = Favorites::load(path.clone());
    assert_eq!(reloaded.items(), &[group(2, "121")]);
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["type"], "group");

    assert!(!favorites.toggle(group(2, "121")).unwrap());
    assert!(Favorites::load(path).items().is_empty());
}

#[test]
fn remove_matches_id_and_kind() {
    let dir = tempdir().unwrap();
    let mut favorites = Favorites::load(dir.path().join("favorites.json"));
    favorites.toggle(group(3, "122")).unwrap();
    favorites
        .toggle(SelectedEntity {
            id: 3,
            name: "Петров П.П.".to_string(),
            kind: EntityKind::Teacher,
        })
        .unwrap();

    assert!(favorites.remove(3, EntityKind::Teacher).unwrap());
    assert!(!favorites.remove(3, EntityKind::Teacher).unwrap());
    assert_eq!(favorites.items(), &[group(3, "122")]);
}
