//! Role-tagged chat messages.
//!
//! The prompt assembler produces these and the chat backend consumes them.
//! A prompt is always: one system instruction, zero or more history pairs,
//! then the grounded user block.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire name shared by every supported backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_roles() {
        assert_eq!(Message::user("Hello!").role, Role::User);
        assert_eq!(Message::assistant("Hi").role, Role::Assistant);
        assert_eq!(Message::system("Be brief").content, "Be brief");
    }

    #[test]
    fn serializes_as_role_and_content() {
        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
        assert_eq!(Role::System.as_str(), "system");
    }
}
