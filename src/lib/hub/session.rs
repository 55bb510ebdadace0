//! Client-side storage for the access and refresh tokens.
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    sync::Mutex,
};

use log::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// A key-value store the gateway reads tokens from and writes refreshed tokens to.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, or removes the key when `value` is `None`.
    fn set(&self, key: &str, value: Option<&str>) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Session kept only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySession {
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let session = MemorySession::default();
        if let Ok(mut values) = session.values.lock() {
            if let Some(access) = access {
                values.insert(ACCESS_TOKEN_KEY.to_owned(), access.to_owned());
            }
            if let Some(refresh) = refresh {
                values.insert(REFRESH_TOKEN_KEY.to_owned(), refresh.to_owned());
            }
        }
        session
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) -> io::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::other("session lock poisoned"))?;
        match value {
            Some(value) => values.insert(key.to_owned(), value.to_owned()),
            None => values.remove(key),
        };
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.values
            .lock()
            .map_err(|_| io::Error::other("session lock poisoned"))?
            .clear();
        Ok(())
    }
}

/// Session persisted as a flat JSON object, so a login survives between launches.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: PathBuf) -> Self {
        FileSession { path }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        match File::open(&self.path)
            .map(BufReader::new)
            .map_err(serde_json::Error::io)
            .and_then(serde_json::from_reader)
        {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    err
                );
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> io::Result<()> {
        debug!("Writing session to {}", self.path.display());
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, values).map_err(io::Error::from)
    }
}

impl SessionStore for FileSession {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: Option<&str>) -> io::Result<()> {
        let mut values = self.read_all();
        match value {
            Some(value) => values.insert(key.to_owned(), value.to_owned()),
            None => values.remove(key),
        };
        self.write_all(&values)
    }

    fn clear(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Option<&str>) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn clear(&self) -> io::Result<()> {
        (**self).clear()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
