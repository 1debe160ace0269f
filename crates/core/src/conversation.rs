//! Conversation-related types.

use converse_model::{Message, Role};

/// Represents a conversation.
///
/// Messages always come in (user, assistant) pairs: a user message is only
/// stored together with the reply it got.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Groups the messages into turns for display.
    ///
    /// A turn starts at every even index holding a user message; the
    /// message after it, if any, is the reply.
    pub fn turns(&self) -> impl Iterator<Item = Turn<'_>> {
        self.messages.chunks(2).filter_map(|pair| {
            let user = pair.first()?;
            if user.role() != Role::User {
                return None;
            }
            Some(Turn {
                user: user.content(),
                assistant: pair.get(1).map(Message::content),
            })
        })
    }

    pub(crate) fn push_turn(&mut self, user: Message, assistant: Message) {
        debug_assert_eq!(user.role(), Role::User);
        debug_assert_eq!(assistant.role(), Role::Assistant);
        self.messages.reserve(2);
        self.messages.push(user);
        self.messages.push(assistant);
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    #[cfg(test)]
    pub(crate) fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// One exchange in a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Turn<'a> {
    /// What the user asked.
    pub user: &'a str,
    /// What the assistant answered, missing while the reply is pending.
    pub assistant: Option<&'a str>,
}
