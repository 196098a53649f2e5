//! File-based session storage implementation.
//!
//! Directory structure:
//! ```text
//! {sessions_dir}/
//!   {session_id}/
//!     session.yaml       # Atomic header snapshot
//!     messages.jsonl     # Append-only message log
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::session::{ChatMode, Message, ModelType, SessionRecord, record};
use crate::store::error::{StorageError, StorageResult};
use crate::store::session::SessionStore;

const HEADER_FILE: &str = "session.yaml";
const MESSAGES_FILE: &str = "messages.jsonl";

/// On-disk session header.
#[derive(Debug, Serialize, Deserialize)]
struct SessionHeader {
    schema_version: String,
    session_id: String,
    model_type: ModelType,
    mode: ChatMode,
    created_at: DateTime<Utc>,
}

impl SessionHeader {
    const SCHEMA_VERSION: &'static str = "1";

    fn from_record(record: &SessionRecord) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            session_id: record.session_id.clone(),
            model_type: record.model_type,
            mode: record.mode,
            created_at: record.created_at,
        }
    }

    fn is_compatible(&self) -> bool {
        self.schema_version == Self::SCHEMA_VERSION
    }

    fn into_record(self, messages: Vec<Message>) -> SessionRecord {
        SessionRecord {
            session_id: self.session_id,
            model_type: self.model_type,
            mode: self.mode,
            messages,
            created_at: self.created_at,
        }
    }
}

/// File-based implementation of `SessionStore`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    sessions_dir: PathBuf,
    ttl: chrono::Duration,
}

impl FileSessionStore {
    /// Create a store rooted at `sessions_dir`; sessions expire `ttl` after creation.
    ///
    /// The directory is created when the first session is stored.
    pub fn new(sessions_dir: impl Into<PathBuf>, ttl: chrono::Duration) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            ttl,
        }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(session_id)
    }

    fn header_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(HEADER_FILE)
    }

    fn messages_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(MESSAGES_FILE)
    }

    /// Reject ids that could escape the sessions directory.
    fn is_valid_id(session_id: &str) -> bool {
        !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    async fn load_header(&self, session_id: &str) -> StorageResult<Option<SessionHeader>> {
        if !Self::is_valid_id(session_id) {
            return Ok(None);
        }
        let path = self.header_path(session_id);

        let contents = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };

        let header: SessionHeader = serde_saphyr::from_str(&contents)
            .map_err(|e| StorageError::file_deserialization(&path, e.to_string()))?;

        if !header.is_compatible() {
            return Err(StorageError::file_incompatible_schema(
                &path,
                SessionHeader::SCHEMA_VERSION,
                &header.schema_version,
            ));
        }

        Ok(Some(header))
    }

    async fn load_messages(&self, session_id: &str) -> StorageResult<Vec<Message>> {
        let path = self.messages_path(session_id);

        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };

        let mut lines = BufReader::new(file).lines();
        let mut messages = Vec::new();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| StorageError::file_io(&path, e))?
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // A torn final write leaves a partial line; skip it.
            match serde_json::from_str::<Message>(trimmed) {
                Ok(message) => messages.push(message),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping malformed message line"),
            }
        }

        Ok(messages)
    }

    fn is_expired(&self, header: &SessionHeader) -> bool {
        record::is_expired(header.created_at, Utc::now(), self.ttl)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    // ========================================================================
    // Records
    // ========================================================================

    async fn create(&self, record: &SessionRecord) -> StorageResult<()> {
        if !Self::is_valid_id(&record.session_id) {
            return Err(StorageError::serialization(format!(
                "invalid session id: {:?}",
                record.session_id
            )));
        }

        let dir = self.session_dir(&record.session_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::file_io(&dir, e))?;

        let final_path = self.header_path(&record.session_id);
        let temp_path = dir.join(format!("{HEADER_FILE}.tmp"));

        let yaml = serde_saphyr::to_string(&SessionHeader::from_record(record))
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        fs::write(&temp_path, yaml.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&temp_path, e))?;
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| StorageError::file_io(&final_path, e))?;

        Ok(())
    }

    async fn find(&self, session_id: &str) -> StorageResult<Option<SessionRecord>> {
        let Some(header) = self.load_header(session_id).await? else {
            return Ok(None);
        };
        if self.is_expired(&header) {
            debug!(session_id, "Session expired");
            return Ok(None);
        }

        let messages = self.load_messages(session_id).await?;
        Ok(Some(header.into_record(messages)))
    }

    async fn append_message(&self, session_id: &str, message: &Message) -> StorageResult<()> {
        if self.load_header(session_id).await?.is_none() {
            return Err(StorageError::not_found("session", session_id));
        }
        let path = self.messages_path(session_id);

        let mut line = serde_json::to_string(message)
            .map_err(|e| StorageError::serialization(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;

        Ok(())
    }

    // ========================================================================
    // Index / Lifecycle
    // ========================================================================

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut sessions = Vec::new();

        let mut entries = match fs::read_dir(&self.sessions_dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&self.sessions_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::file_io(&self.sessions_dir, e))?
        {
            let path = entry.path();
            if path.join(HEADER_FILE).is_file()
                && let Some(name) = path.file_name()
            {
                sessions.push(name.to_string_lossy().to_string());
            }
        }

        Ok(sessions)
    }

    async fn delete(&self, session_id: &str) -> StorageResult<()> {
        if !Self::is_valid_id(session_id) {
            return Ok(());
        }
        let dir = self.session_dir(session_id);

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::file_io(&dir, e)),
        }
    }

    async fn purge_expired(&self) -> StorageResult<usize> {
        let mut removed = 0;

        for session_id in self.list().await? {
            let header = match self.load_header(&session_id).await {
                Ok(Some(header)) => header,
                Ok(None) => continue,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Skipping unreadable session during purge");
                    continue;
                }
            };
            if self.is_expired(&header) {
                self.delete(&session_id).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir) -> FileSessionStore {
        FileSessionStore::new(temp_dir.path().join("sessions"), chrono::Duration::days(30))
    }

    fn create_record() -> SessionRecord {
        SessionRecord::new(ModelType::Flash25, ChatMode::SymptomChecker)
    }

    #[tokio::test]
    async fn create_then_find_round_trips_header() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let record = create_record();

        store.create(&record).await.unwrap();
        let loaded = store.find(&record.session_id).await.unwrap().unwrap();

        assert_eq!(loaded.session_id, record.session_id);
        assert_eq!(loaded.model_type, ModelType::Flash25);
        assert_eq!(loaded.mode, ChatMode::SymptomChecker);
        assert_eq!(loaded.created_at, record.created_at);
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn messages_are_returned_in_append_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let record = create_record();
        store.create(&record).await.unwrap();

        let first = Message::new(Role::User, "I have a headache");
        let second = Message::new(Role::Model, "How long has it lasted?");
        store.append_message(&record.session_id, &first).await.unwrap();
        store.append_message(&record.session_id, &second).await.unwrap();

        let loaded = store.find(&record.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.messages, vec![first, second]);
    }

    #[tokio::test]
    async fn append_to_unknown_session_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let err = store
            .append_message("missing", &Message::new(Role::User, "hi"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn find_unknown_session_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        assert!(store.find("missing").await.unwrap().is_none());
        assert!(store.find("../escape").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let record = create_record();
        store.create(&record).await.unwrap();

        let message = Message::new(Role::User, "hello");
        store.append_message(&record.session_id, &message).await.unwrap();

        let path = store.messages_path(&record.session_id);
        let mut contents = fs::read_to_string(&path).await.unwrap();
        contents.push_str("{\"role\":\"model\",\"te");
        fs::write(&path, contents).await.unwrap();

        let loaded = store.find(&record.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.messages, vec![message]);
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_purged() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let mut stale = create_record();
        stale.created_at = Utc::now() - chrono::Duration::days(31);
        let fresh = create_record();
        store.create(&stale).await.unwrap();
        store.create(&fresh).await.unwrap();

        assert!(store.find(&stale.session_id).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.list().await.unwrap(), vec![fresh.session_id.clone()]);
    }

    #[tokio::test]
    async fn incompatible_schema_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let record = create_record();
        store.create(&record).await.unwrap();

        let yaml = format!(
            "schema_version: \"9\"\nsession_id: {}\nmodel_type: gemini-2.5-flash\nmode: symptom-checker\ncreated_at: \"{}\"\n",
            record.session_id,
            Utc::now().to_rfc3339()
        );
        fs::write(store.header_path(&record.session_id), yaml)
            .await
            .unwrap();

        let err = store.find(&record.session_id).await.unwrap_err();
        assert!(matches!(err, StorageError::FileIncompatibleSchema { .. }));
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);
        let record = create_record();
        store.create(&record).await.unwrap();

        store.delete(&record.session_id).await.unwrap();
        assert!(store.find(&record.session_id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());

        // Deleting again is fine.
        store.delete(&record.session_id).await.unwrap();
    }

    #[tokio::test]
    async fn list_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(create_store(&temp_dir).list().await.unwrap().is_empty());
    }
}
