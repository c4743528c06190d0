use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Current Unix time in milliseconds, the unit every record timestamp uses.
pub fn now_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Who authored a message. Only these two literals exist on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sender: '{0}'. Valid options: 'user', 'bot'")]
pub struct UnknownSender(pub String);

impl FromStr for Sender {
    type Err = UnknownSender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(UnknownSender(other.to_string())),
        }
    }
}

/// A single chat message inside a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub conversation_id: u64,
    pub content: String,
    pub sender: Sender,
    pub timestamp: u64,
}

impl Message {
    /// Build a message stamped with the current time. The id reuses the
    /// timestamp, so two messages created in the same millisecond collide.
    pub fn new(conversation_id: u64, sender: Sender, content: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: now,
            conversation_id,
            content: content.into(),
            sender,
            timestamp: now,
        }
    }

    pub fn user(conversation_id: u64, content: impl Into<String>) -> Self {
        Self::new(conversation_id, Sender::User, content)
    }

    pub fn bot(conversation_id: u64, content: impl Into<String>) -> Self {
        Self::new(conversation_id, Sender::Bot, content)
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_from_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// Summary row for a chat thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub title: String,
    pub avatar: String,
    #[serde(rename = "lastMessage")]
    pub last_message: String,
    pub timestamp: u64,
}

impl Conversation {
    pub fn new(id: u64, title: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            avatar: avatar.into(),
            last_message: String::new(),
            timestamp: now_millis(),
        }
    }

    /// Refresh the preview from a message of this thread.
    ///
    /// Returns `false` and leaves the summary untouched when the message
    /// belongs to another conversation.
    pub fn record_message(&mut self, message: &Message) -> bool {
        if message.conversation_id != self.id {
            return false;
        }
        self.last_message = message.content.clone();
        self.timestamp = message.timestamp;
        true
    }
}

/// One increment of a streamed bot reply.
///
/// `content` is the delta since the previous chunk, not the text so far.
/// The chunk with `is_complete` set closes the stream for its conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChunk {
    pub conversation_id: u64,
    pub content: String,
    pub is_complete: bool,
}

impl MessageChunk {
    pub fn delta(conversation_id: u64, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
            is_complete: false,
        }
    }

    /// Terminal chunk. Carries no text of its own.
    pub fn complete(conversation_id: u64) -> Self {
        Self {
            conversation_id,
            content: String::new(),
            is_complete: true,
        }
    }
}
