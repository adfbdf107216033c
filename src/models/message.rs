use super::reference::ContentReference;
use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation as it is shown and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Entries persisted without an id, or with a null one, deserialize with
    /// an empty id; see [`Message::ensure_id`].
    #[serde(default, deserialize_with = "nullable_id")]
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ContentReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Local>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    /// Empty assistant message that receives streamed text.
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: new_message_id(),
            role,
            content,
            references: None,
            created_at: Some(Local::now()),
        }
    }

    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = new_message_id();
        }
    }

    pub fn references(&self) -> &[ContentReference] {
        self.references.as_deref().unwrap_or(&[])
    }

    /// True when nothing has been streamed into the message yet.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.references().is_empty()
    }
}

pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

fn nullable_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_entry_without_id_gets_one() {
        let mut message: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert!(message.id.is_empty());

        message.ensure_id();
        assert!(!message.id.is_empty());
        assert_eq!(message.role, Role::Assistant);
    }

    #[test]
    fn test_null_id_gets_one() {
        let mut message: Message =
            serde_json::from_str(r#"{"id":null,"role":"user","content":"hi"}"#).unwrap();
        assert!(message.id.is_empty());

        message.ensure_id();
        assert!(!message.id.is_empty());
    }

    #[test]
    fn test_ensure_id_keeps_existing_id() {
        let mut message = Message::user("hello");
        let id = message.id.clone();
        message.ensure_id();
        assert_eq!(message.id, id);
    }

    #[test]
    fn test_references_are_omitted_when_absent() {
        let message = Message::user("hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("references").is_none());
    }
}
