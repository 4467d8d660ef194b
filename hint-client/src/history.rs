//! Per-definition help history.
//!
//! Entries are stored under `61a-bot/<definition name>` and only ever
//! appended to. The orchestrator reads the whole list and replays the
//! most recent few.

use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use context_window::HistoryEntry;
use tracing::debug;

use crate::errors::Result;

/// Key namespace shared with the editor extension's workspace state.
pub const HISTORY_NAMESPACE: &str = "61a-bot";

pub fn history_key(definition_name: &str) -> String {
    format!("{HISTORY_NAMESPACE}/{definition_name}")
}

/// Persistent key-value history, scoped to one workspace.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All entries for `key`, oldest first; empty when none were stored.
    async fn load(&self, key: &str) -> Result<Vec<HistoryEntry>>;

    async fn append(&self, key: &str, entry: HistoryEntry) -> Result<()>;
}

/// In-process store; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<HashMap<String, Vec<HistoryEntry>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self, key: &str) -> Result<Vec<HistoryEntry>> {
        let map = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(map.get(key).cloned().unwrap_or_default())
    }

    async fn append(&self, key: &str, entry: HistoryEntry) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(key.to_string()).or_default().push(entry);
        Ok(())
    }
}

/// One JSON object on disk mapping keys to entry lists.
///
/// Appends rewrite the file through a sibling temp file and a rename, so a
/// crash never leaves half a document behind.
#[derive(Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

type HistoryFile = BTreeMap<String, Vec<HistoryEntry>>;

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HistoryFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(HistoryFile::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history file yet");
                Ok(HistoryFile::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn load(&self, key: &str) -> Result<Vec<HistoryEntry>> {
        let mut all = self.read_all().await?;
        Ok(all.remove(key).unwrap_or_default())
    }

    async fn append(&self, key: &str, entry: HistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        all.entry(key.to_string()).or_default().push(entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&all)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(%key, path = %self.path.display(), "history entry appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(format!("code{n}"), format!("help{n}"), format!("id{n}"))
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(history_key("my_func"), "61a-bot/my_func");
    }

    #[tokio::test]
    async fn memory_store_appends_in_order() {
        let store = MemoryHistoryStore::new();
        store.append("k", entry(1)).await.unwrap();
        store.append("k", entry(2)).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), [entry(1), entry(2)]);
        assert!(store.load("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("history.json");

        let store = JsonFileHistoryStore::new(&path);
        assert!(store.load("61a-bot/f").await.unwrap().is_empty());
        store.append("61a-bot/f", entry(1)).await.unwrap();
        store.append("61a-bot/g", entry(2)).await.unwrap();
        store.append("61a-bot/f", entry(3)).await.unwrap();

        let reopened = JsonFileHistoryStore::new(&path);
        assert_eq!(reopened.load("61a-bot/f").await.unwrap(), [entry(1), entry(3)]);
        assert_eq!(reopened.load("61a-bot/g").await.unwrap(), [entry(2)]);

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["61a-bot/f"][0]["requestId"], "id1");
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{oops").unwrap();
        assert!(JsonFileHistoryStore::new(&path).load("k").await.is_err());
    }
}
