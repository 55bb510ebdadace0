//! Groups and teachers a user pinned, kept in a local JSON file.
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use log::{debug, warn};

use super::models::schedule_model::{EntityKind, SelectedEntity};

#[derive(Debug, Clone)]
pub struct Favorites {
    path: PathBuf,
    items: Vec<SelectedEntity>,
}

impl Favorites {
    /// Reads favorites from `path`. A missing or unreadable file gives an empty list.
    pub fn load(path: PathBuf) -> Self {
        let items = if path.exists() {
            match File::open(&path)
                .map(BufReader::new)
                .map_err(serde_json::Error::io)
                .and_then(serde_json::from_reader)
            {
                Ok(items) => items,
                Err(err) => {
                    warn!("Ignoring unreadable favorites file {}: {}", path.display(), err);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        Favorites { path, items }
    }

    pub fn items(&self) -> &[SelectedEntity] {
        &self.items
    }

    pub fn contains(&self, id: u64, kind: EntityKind) -> bool {
        self.items
            .iter()
            .any(|item| item.id == id && item.kind == kind)
    }

    /// Adds `entity`, or removes it when it is already a favorite. Returns
    /// whether it is a favorite afterwards.
    pub fn toggle(&mut self, entity: SelectedEntity) -> io::Result<bool> {
        if self.contains(entity.id, entity.kind) {
            self.remove(entity.id, entity.kind)?;
            return Ok(false);
        }
        debug!("Adding {} to favorites", entity.name);
        self.items.push(entity);
        self.save()?;
        Ok(true)
    }

    /// Removes the favorite with this id and kind; returns whether there was one.
    pub fn remove(&mut self, id: u64, kind: EntityKind) -> io::Result<bool> {
        let before = self.items.len();
        self.items
            .retain(|item| !(item.id == id && item.kind == kind));
        if self.items.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> io::Result<()> {
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &self.items).map_err(io::Error::from)
    }
}

#[cfg(test)]
#[path = "tests/favorites_tests.rs"]
mod tests;
