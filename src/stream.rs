use futures::{Stream, StreamExt};
use std::collections::{HashMap, HashSet};

use crate::types::{Message, MessageChunk};

// ============================================
// Error Types
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("Stream for conversation {conversation_id} already completed")]
    AlreadyComplete { conversation_id: u64 },

    #[error("Stream for conversation {conversation_id} is still in progress")]
    Incomplete { conversation_id: u64 },

    #[error("Stream for conversation {conversation_id} ended without a terminal chunk")]
    Truncated { conversation_id: u64 },

    #[error("No stream for conversation {conversation_id}")]
    NotFound { conversation_id: u64 },
}

/// What a pushed chunk did to its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Pending,
    /// The stream finished; carries the full reply text.
    Complete(String),
}

// ============================================
// Assembler
// ============================================

#[derive(Debug, Default)]
struct StreamEntry {
    buffer: String,
    done: bool,
}

/// Folds chunk deltas into whole replies, one stream per conversation.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    entries: HashMap<u64, StreamEntry>,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to its conversation's reply.
    ///
    /// A chunk arriving after that conversation's terminal chunk is rejected
    /// and leaves the assembled text as it was. Finished streams are kept
    /// for that check until removed with `take`, `reset`, `into_bot_message`
    /// or `drain_completed`.
    pub fn push(&mut self, chunk: MessageChunk) -> Result<ChunkOutcome, StreamError> {
        let conversation_id = chunk.conversation_id;
        let entry = self.entries.entry(conversation_id).or_default();

        if entry.done {
            tracing::warn!(conversation_id, "chunk received after stream completed");
            return Err(StreamError::AlreadyComplete { conversation_id });
        }

        entry.buffer.push_str(&chunk.content);

        if chunk.is_complete {
            entry.done = true;
            tracing::debug!(
                conversation_id,
                len = entry.buffer.len(),
                "stream completed"
            );
            Ok(ChunkOutcome::Complete(entry.buffer.clone()))
        } else {
            Ok(ChunkOutcome::Pending)
        }
    }

    /// Text so far and whether the stream has finished.
    pub fn snapshot(&self, conversation_id: u64) -> Option<(&str, bool)> {
        self.entries
            .get(&conversation_id)
            .map(|entry| (entry.buffer.as_str(), entry.done))
    }

    /// Remove a stream, finished or not, and return its text.
    pub fn take(&mut self, conversation_id: u64) -> Option<String> {
        self.entries
            .remove(&conversation_id)
            .map(|entry| entry.buffer)
    }

    /// Forget a conversation's stream so a new reply can start.
    /// Returns whether there was anything to forget.
    pub fn reset(&mut self, conversation_id: u64) -> bool {
        self.entries.remove(&conversation_id).is_some()
    }

    /// Conversations with a reply still streaming, in ascending id order.
    pub fn active(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.done)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Remove every finished stream and return `(conversation_id, text)`
    /// pairs in ascending id order. Unfinished streams stay.
    pub fn drain_completed(&mut self) -> Vec<(u64, String)> {
        let mut ids: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.done)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();

        ids.into_iter()
            .filter_map(|id| self.take(id).map(|text| (id, text)))
            .collect()
    }

    /// Turn a finished reply into a bot message and drop the stream.
    pub fn into_bot_message(&mut self, conversation_id: u64) -> Result<Message, StreamError> {
        match self.entries.get(&conversation_id) {
            None => Err(StreamError::NotFound { conversation_id }),
            Some(entry) if !entry.done => Err(StreamError::Incomplete { conversation_id }),
            Some(_) => {
                let text = self.take(conversation_id).unwrap_or_default();
                Ok(Message::bot(conversation_id, text))
            }
        }
    }
}

// ============================================
// Sequence Helpers
// ============================================

/// Check that, per conversation, at most one chunk is terminal and nothing
/// follows it.
pub fn validate_sequence(chunks: &[MessageChunk]) -> Result<(), StreamError> {
    let mut completed = HashSet::new();

    for chunk in chunks {
        if completed.contains(&chunk.conversation_id) {
            return Err(StreamError::AlreadyComplete {
                conversation_id: chunk.conversation_id,
            });
        }
        if chunk.is_complete {
            completed.insert(chunk.conversation_id);
        }
    }

    Ok(())
}

/// Drive `chunks` until `conversation_id`'s reply completes and return its
/// full text. Chunks for other conversations are skipped.
pub async fn collect_response<S>(chunks: S, conversation_id: u64) -> Result<String, StreamError>
where
    S: Stream<Item = MessageChunk>,
{
    futures::pin_mut!(chunks);
    let mut buffer = String::new();

    while let Some(chunk) = chunks.next().await {
        if chunk.conversation_id != conversation_id {
            tracing::trace!(
                expected = conversation_id,
                got = chunk.conversation_id,
                "skipping chunk for another conversation"
            );
            continue;
        }

        buffer.push_str(&chunk.content);
        if chunk.is_complete {
            return Ok(buffer);
        }
    }

    tracing::warn!(conversation_id, "chunk stream ended before completion");
    Err(StreamError::Truncated { conversation_id })
}
