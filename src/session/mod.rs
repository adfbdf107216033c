mod filesystem;
mod memory;
mod storage;

pub use filesystem::{FilesystemConversationStore, CONVERSATION_ID_FILE, MESSAGES_FILE};
pub use memory::MemoryConversationStore;
pub use storage::ConversationStore;

use crate::models::Message;

/// Give every restored message an id; legacy histories were saved without.
pub fn backfill_ids(messages: &mut [Message]) {
    for message in messages.iter_mut() {
        message.ensure_id();
    }
}
