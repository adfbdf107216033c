use crate::error::Result;
use crate::models::Message;

/// Local persistence for one conversation: its message history and the
/// server-assigned conversation id.
///
/// Implementations report faults; the chat state machine decides to ignore
/// them.
pub trait ConversationStore: Send + Sync {
    /// Load the persisted history. A missing history is an empty list.
    fn load(&self) -> Result<Vec<Message>>;

    fn save(&self, messages: &[Message]) -> Result<()>;

    /// Remove the persisted history and the conversation id.
    fn clear(&self) -> Result<()>;

    fn conversation_id(&self) -> Result<Option<String>>;

    fn set_conversation_id(&self, id: &str) -> Result<()>;

    fn clear_conversation_id(&self) -> Result<()>;
}

impl<S: ConversationStore + ?Sized> ConversationStore for Box<S> {
    fn load(&self) -> Result<Vec<Message>> {
        (**self).load()
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        (**self).save(messages)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn conversation_id(&self) -> Result<Option<String>> {
        (**self).conversation_id()
    }

    fn set_conversation_id(&self, id: &str) -> Result<()> {
        (**self).set_conversation_id(id)
    }

    fn clear_conversation_id(&self) -> Result<()> {
        (**self).clear_conversation_id()
    }
}
