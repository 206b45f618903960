//! Read-only transcript view supplied by the transport.
//!
//! History is consumed through a [`TranscriptCursor`]: a finite, pull-based,
//! non-restartable sequence of entries, newest first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelResult;

/// Identifies the author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport handle of a transcript entry, used to delete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One message in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub author_id: AuthorId,
    pub is_bot: bool,
    pub content: String,
    /// Position in the channel, increasing with time.
    pub sequence_position: u64,
}

/// Newest-first history traversal.
pub struct TranscriptCursor {
    inner: Box<dyn Iterator<Item = TranscriptEntry> + Send>,
}

impl TranscriptCursor {
    pub fn new(entries: impl Iterator<Item = TranscriptEntry> + Send + 'static) -> Self {
        Self {
            inner: Box::new(entries),
        }
    }

    /// Cursor over `entries`, which must already be newest first.
    pub fn from_newest_first(entries: Vec<TranscriptEntry>) -> Self {
        Self::new(entries.into_iter())
    }
}

impl Iterator for TranscriptCursor {
    type Item = TranscriptEntry;

    fn next(&mut self) -> Option<TranscriptEntry> {
        self.inner.next()
    }
}

impl fmt::Debug for TranscriptCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptCursor").finish_non_exhaustive()
    }
}

/// Removes entries from the transport's transcript.
pub trait EntryDeleter {
    /// Delete one entry. Fails if it is already gone or not deletable.
    fn delete_entry(&mut self, entry: &TranscriptEntry) -> ChannelResult<()>;
}
