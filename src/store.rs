//! In-memory chat state
//!
//! Conversations and their messages as the chat window sees them. Nothing
//! here is written to disk.

use crate::types::{Conversation, Message};

/// Preview text of a conversation that has no messages yet.
pub const NEW_CONVERSATION_PREVIEW: &str = "Start a new conversation";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Conversation {0} does not exist")]
    ConversationNotFound(u64),
}

/// All conversations and messages of a chat session.
///
/// Plain `&mut self` state; share it behind a lock when several tasks need it.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from records loaded elsewhere.
    pub fn with_records(conversations: Vec<Conversation>, messages: Vec<Message>) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// Every conversation, in insertion order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, conversation_id: u64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    /// Messages of one conversation in the order they were added.
    pub fn conversation_messages(&self, conversation_id: u64) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    /// Create a conversation with the next free id (highest id + 1).
    pub fn create_conversation(
        &mut self,
        title: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Conversation {
        let id = self.conversations.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let mut conversation = Conversation::new(id, title, avatar);
        conversation.last_message = NEW_CONVERSATION_PREVIEW.to_string();

        self.conversations.push(conversation.clone());
        tracing::info!(conversation_id = id, title = %conversation.title, "conversation created");
        conversation
    }

    /// Remove a conversation together with all of its messages.
    pub fn delete_conversation(&mut self, conversation_id: u64) -> Result<(), StoreError> {
        let position = self
            .conversations
            .iter()
            .position(|c| c.id == conversation_id)
            .ok_or(StoreError::ConversationNotFound(conversation_id))?;

        self.conversations.remove(position);
        let before = self.messages.len();
        self.messages.retain(|m| m.conversation_id != conversation_id);

        tracing::info!(
            conversation_id,
            removed_messages = before - self.messages.len(),
            "conversation deleted"
        );
        Ok(())
    }

    /// Record a user message and refresh its conversation's preview.
    pub fn send_user_message(
        &mut self,
        conversation_id: u64,
        content: impl Into<String>,
    ) -> Message {
        let message = Message::user(conversation_id, content);
        self.add_message(message.clone());
        message
    }

    /// Append any message, user or bot, and refresh the preview.
    ///
    /// A message for an unknown conversation is still stored; only the
    /// preview update is skipped.
    pub fn add_message(&mut self, message: Message) {
        match self
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
        {
            Some(conversation) => {
                conversation.record_message(&message);
            }
            None => {
                tracing::info!(
                    conversation_id = message.conversation_id,
                    "message for unknown conversation"
                );
            }
        }

        tracing::debug!(
            message_id = message.id,
            conversation_id = message.conversation_id,
            sender = %message.sender,
            "message stored"
        );
        self.messages.push(message);
    }
}
