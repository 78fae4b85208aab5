//! Narrative messages produced by combat and noise.
//!
//! The rules never print; they push lines into a [`MessageSink`] chosen by
//! the caller. [`MessageLog`] is the in-memory sink used by the runtime and
//! by tests.

/// Category of a message, used by front-ends for colouring and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageChannel {
    Plain,
    Combat,
    Sound,
    /// Something that threatens the player directly.
    Danger,
    Diagnostic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub channel: MessageChannel,
    pub text: String,
}

/// Destination for narrative output.
pub trait MessageSink {
    fn push(&mut self, channel: MessageChannel, text: String);
}

/// Append-only message buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Removes and returns every buffered message.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// True if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSink for MessageLog {
    fn push(&mut self, channel: MessageChannel, text: String) {
        tracing::trace!(target: "crawl_core::message", %channel, %text);
        self.messages.push(Message { channel, text });
    }
}
