use serde::{Deserialize, Deserializer, Serialize};

/// The author of a [`Message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing prompts.
    User,
    /// The model answering them.
    Assistant,
}

/// A complete message in a conversation.
///
/// On the wire a message is an object tagged by its role, e.g.
/// `{"role": "user", "content": "Hello"}`. A missing or `null` content is
/// read as an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// A user input text.
    User {
        /// The text of the message.
        #[serde(default, deserialize_with = "null_as_empty")]
        content: String,
    },
    /// An assistant text.
    Assistant {
        /// The text of the message.
        #[serde(default, deserialize_with = "null_as_empty")]
        content: String,
    },
}

impl Message {
    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message::Assistant {
            content: content.into(),
        }
    }

    /// Returns the author of this message.
    #[inline]
    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
        }
    }

    /// Returns the text of this message.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            Message::User { content } | Message::Assistant { content } => {
                content
            }
        }
    }
}

/// A request to be sent to the completion backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full conversation history, oldest first, ending with the
    /// newest user message.
    pub messages: Vec<Message>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
