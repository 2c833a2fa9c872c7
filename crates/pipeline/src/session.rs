//! Persisted session record.
//!
//! One JSON file holds the last successfully extracted parcel key and its
//! resolved coordinate, so a risk query can run in a later invocation
//! without re-scraping. Writes go through a temp file and rename, making
//! the key+coordinate pair a single committed unit.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use foundation::{ParcelKey, PlanarCoordinate};

/// What survives between orchestrator invocations.
///
/// Populated only by a successful locate+resolve run and replaced only by
/// the next one; there is no expiry. The in-progress guard is runtime
/// state on the orchestrator, not part of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub parcel_key: Option<ParcelKey>,
    #[serde(default)]
    pub coordinate: Option<PlanarCoordinate>,
}

/// Error type for session persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Corrupt(msg) => write!(f, "session record corrupt: {msg}"),
            SessionError::Io(msg) => write!(f, "session storage error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

pub struct SessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load_unlocked(&self) -> Result<SessionState, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).map_err(|e| SessionError::Corrupt(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionState::default()),
            Err(e) => Err(SessionError::Io(e.to_string())),
        }
    }

    async fn save_unlocked(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Io(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(state).map_err(|e| SessionError::Io(e.to_string()))?;
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| SessionError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SessionError::Io(e.to_string()))?;
        Ok(())
    }

    pub async fn load(&self) -> Result<SessionState, SessionError> {
        let _g = self.lock.lock().await;
        self.load_unlocked().await
    }

    pub async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let _g = self.lock.lock().await;
        self.save_unlocked(state).await
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, SessionStore};
    use foundation::{ParcelKey, PlanarCoordinate};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn missing_file_loads_as_empty_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.expect("load"), SessionState::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        let state = SessionState {
            parcel_key: ParcelKey::parse("24505A0123/00C000"),
            coordinate: Some(PlanarCoordinate::new(152204.1, 211835.7)),
        };
        store.save(&state).await.expect("save");

        assert_eq!(store.load().await.expect("load"), state);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_record_is_reported_not_silently_reset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").expect("write");

        let store = SessionStore::new(path);
        assert!(store.load().await.is_err());
    }
}
