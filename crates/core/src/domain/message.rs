use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
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
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Latest user turn of a conversation; this is what gets embedded for retrieval.
pub fn last_user_message(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User && !m.content.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_lowercase_roles() {
        let v = json!([
            {"role": "system", "content": "s"},
            {"role": "user", "content": "u"},
            {"role": "assistant", "content": "a"},
        ]);
        let parsed: Vec<Message> = serde_json::from_value(v).unwrap();
        assert_eq!(parsed[0].role, Role::System);
        assert_eq!(parsed[1].role, Role::User);
        assert_eq!(parsed[2].role, Role::Assistant);
    }

    #[test]
    fn rejects_unknown_role() {
        let v = json!([{"role": "tool", "content": "x"}]);
        assert!(serde_json::from_value::<Vec<Message>>(v).is_err());
    }

    #[test]
    fn last_user_message_skips_trailing_assistant_turns() {
        let messages = vec![
            Message::user("first question"),
            Message::assistant("answer"),
            Message::user("second question"),
            Message::assistant("another answer"),
        ];
        let last = last_user_message(&messages).unwrap();
        assert_eq!(last.content, "second question");
    }

    #[test]
    fn last_user_message_is_none_without_user_turns() {
        let messages = vec![Message::assistant("hello")];
        assert!(last_user_message(&messages).is_none());
    }
}
