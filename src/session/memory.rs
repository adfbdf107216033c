use super::storage::ConversationStore;
use crate::error::{ChatError, Result};
use crate::models::Message;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    messages: Option<Vec<Message>>,
    conversation_id: Option<String>,
}

/// Store that keeps the conversation for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryConversationStore {
    inner: Mutex<Inner>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing history, as if it had been saved earlier.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.messages = Some(messages);
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ChatError::StorageError("memory store poisoned".to_string()))
    }
}

impl ConversationStore for MemoryConversationStore {
    fn load(&self) -> Result<Vec<Message>> {
        let mut messages = self.lock()?.messages.clone().unwrap_or_default();
        super::backfill_ids(&mut messages);
        Ok(messages)
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        self.lock()?.messages = Some(messages.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.messages = None;
        inner.conversation_id = None;
        Ok(())
    }

    fn conversation_id(&self) -> Result<Option<String>> {
        Ok(self.lock()?.conversation_id.clone())
    }

    fn set_conversation_id(&self, id: &str) -> Result<()> {
        self.lock()?.conversation_id = Some(id.to_string());
        Ok(())
    }

    fn clear_conversation_id(&self) -> Result<()> {
        self.lock()?.conversation_id = None;
        Ok(())
    }
}
