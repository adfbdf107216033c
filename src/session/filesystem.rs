use super::storage::ConversationStore;
use crate::error::{ChatError, Result};
use crate::models::Message;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MESSAGES_FILE: &str = "chat_messages.json";
pub const CONVERSATION_ID_FILE: &str = "chat_conversation_id";

pub struct FilesystemConversationStore {
    dir: PathBuf,
}

impl FilesystemConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/sitechat`, e.g. `~/.local/share/sitechat` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("sitechat"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn messages_path(&self) -> PathBuf {
        self.dir.join(MESSAGES_FILE)
    }

    fn conversation_id_path(&self) -> PathBuf {
        self.dir.join(CONVERSATION_ID_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_optional(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ConversationStore for FilesystemConversationStore {
    fn load(&self) -> Result<Vec<Message>> {
        let Some(content) = read_optional(&self.messages_path())? else {
            return Ok(Vec::new());
        };

        let mut messages: Vec<Message> = serde_json::from_str(&content)?;
        super::backfill_ids(&mut messages);
        Ok(messages)
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(messages)?;
        fs::write(self.messages_path(), content)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        remove_optional(&self.messages_path())?;
        remove_optional(&self.conversation_id_path())
    }

    fn conversation_id(&self) -> Result<Option<String>> {
        let id = read_optional(&self.conversation_id_path())?
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(id)
    }

    fn set_conversation_id(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ChatError::StorageError(
                "conversation id must not be empty".to_string(),
            ));
        }
        self.ensure_dir()?;
        fs::write(self.conversation_id_path(), id.trim())?;
        Ok(())
    }

    fn clear_conversation_id(&self) -> Result<()> {
        remove_optional(&self.conversation_id_path())
    }
}
