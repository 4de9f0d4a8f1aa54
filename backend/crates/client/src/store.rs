//! Token Storage
//!
//! Where the client keeps `{token, user}` between requests. The file store
//! plays the role browser local storage plays for the web frontend.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ClientResult;
use crate::models::{Session, User};

pub trait TokenStore: Send + Sync {
    fn session(&self) -> Option<Session>;

    fn save(&self, session: Session) -> ClientResult<()>;

    fn clear(&self) -> ClientResult<()>;

    fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }
}

fn read(lock: &RwLock<Option<Session>>) -> RwLockReadGuard<'_, Option<Session>> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(lock: &RwLock<Option<Session>>) -> RwLockWriteGuard<'_, Option<Session>> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn session(&self) -> Option<Session> {
        read(&self.session).clone()
    }

    fn save(&self, session: Session) -> ClientResult<()> {
        *write(&self.session) = Some(session);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *write(&self.session) = None;
        Ok(())
    }
}

/// JSON file with an in-memory copy; the file is read once on open
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl FileTokenStore {
    /// A missing or unreadable file starts signed out
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring corrupt session file"
                    );
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn session(&self) -> Option<Session> {
        read(&self.cached).clone()
    }

    fn save(&self, session: Session) -> ClientResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&session)?)?;
        *write(&self.cached) = Some(session);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *write(&self.cached) = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
