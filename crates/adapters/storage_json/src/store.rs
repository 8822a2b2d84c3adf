//! The JSON document store and its write path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::document::StateDocument;
use crate::error::StorageError;

/// Application state backed by a single JSON file.
///
/// All reads and writes go through one async mutex, so mutations never
/// interleave and readers never see a change that has not reached disk.
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
    state: Mutex<StateDocument>,
}

impl JsonStateStore {
    /// Load the document at `path`.
    ///
    /// Never fails: a missing file yields an empty document, and an
    /// unreadable or corrupt one is logged and replaced by an empty
    /// document on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load(&path).await;
        tracing::info!(
            path = %path.display(),
            automations = state.automations.len(),
            "state loaded"
        );
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Start from an in-memory document; nothing is read from `path`.
    pub fn with_document(path: impl Into<PathBuf>, state: StateDocument) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `read` against the committed document.
    pub(crate) async fn read<T, F>(&self, read: F) -> T
    where
        F: FnOnce(&StateDocument) -> T + Send,
    {
        let state = self.state.lock().await;
        read(&state)
    }

    /// Apply `apply` to a copy of the document, persist it, then commit.
    ///
    /// If the write fails the in-memory document is left as it was.
    pub(crate) async fn mutate<T, F>(&self, apply: F) -> Result<T, StorageError>
    where
        T: Send,
        F: FnOnce(&mut StateDocument) -> T + Send,
    {
        let mut current = self.state.lock().await;
        let mut next = current.clone();
        let out = apply(&mut next);
        write_atomically(&self.path, &next).await?;
        *current = next;
        Ok(out)
    }

    /// Like [`Self::mutate`], but `apply` may decline by returning
    /// `Ok(None)`, in which case nothing is written. An `Err` also aborts
    /// without writing.
    pub(crate) async fn try_mutate<T, E, F>(&self, apply: F) -> Result<Option<T>, E>
    where
        T: Send,
        E: From<StorageError> + Send,
        F: FnOnce(&mut StateDocument) -> Result<Option<T>, E> + Send,
    {
        let mut current = self.state.lock().await;
        let mut next = current.clone();
        let Some(out) = apply(&mut next)? else {
            return Ok(None);
        };
        write_atomically(&self.path, &next).await?;
        *current = next;
        Ok(Some(out))
    }
}

async fn load(path: &Path) -> StateDocument {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no state file yet, starting empty");
            return StateDocument::default();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read state file, starting empty");
            return StateDocument::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "failed to parse state file, starting empty");
        StateDocument::default()
    })
}

async fn write_atomically(path: &Path, state: &StateDocument) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::trace!(path = %path.display(), bytes = bytes.len(), "state written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_start_empty_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::open(dir.path().join("state.json")).await;
        let doc = store.read(|doc| doc.clone()).await;
        assert_eq!(doc, StateDocument::default());
    }

    #[tokio::test]
    async fn should_start_empty_when_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonStateStore::open(&path).await;
        let doc = store.read(|doc| doc.clone()).await;
        assert_eq!(doc, StateDocument::default());
    }

    #[tokio::test]
    async fn should_persist_mutation_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = JsonStateStore::open(&path).await;

        store
            .mutate(|doc| {
                doc.secrets.insert("elevenlabs".to_string(), "sk".to_string());
            })
            .await
            .unwrap();

        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
        let reloaded = JsonStateStore::open(&path).await;
        let value = reloaded
            .read(|doc| doc.secrets.get("elevenlabs").cloned())
            .await;
        assert_eq!(value.as_deref(), Some("sk"));
    }

    #[tokio::test]
    async fn should_not_commit_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be makes the rename fail
        let path = dir.path().join("state.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();
        let store = JsonStateStore::with_document(&path, StateDocument::default());

        let result = store
            .mutate(|doc| {
                doc.secrets.insert("k".to_string(), "v".to_string());
            })
            .await;

        assert!(result.is_err());
        assert!(store.read(|doc| doc.secrets.is_empty()).await);
    }

    #[tokio::test]
    async fn should_skip_write_when_mutation_declines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonStateStore::open(&path).await;

        let out: Option<()> = store
            .try_mutate(|_| Ok::<_, StorageError>(None))
            .await
            .unwrap();

        assert!(out.is_none());
        assert!(!path.exists());
    }
}
