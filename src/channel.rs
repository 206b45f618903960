//! Chat transport abstraction.
//!
//! `ChatChannel` is what the bot needs from a chat service: its own identity,
//! newest-first history, deletion and sending. Message delivery, presence and
//! reconnects stay on the transport's side of this trait.
//!
//! `MemoryChannel` keeps the transcript in memory; the console transport and
//! the tests run on it.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::history::{AuthorId, EntryDeleter, EntryId, TranscriptCursor, TranscriptEntry};

// ── Errors ───────────────────────────────────────────────────────────────

/// Errors specific to the chat transport layer.
#[derive(Debug, Error, Diagnostic)]
pub enum ChannelError {
    #[error("entry {entry_id} not found")]
    #[diagnostic(
        code(ngram::channel::not_found),
        help("The message was already deleted or never existed in this channel.")
    )]
    NotFound { entry_id: u64 },

    #[error("transport error: {message}")]
    #[diagnostic(
        code(ngram::channel::transport),
        help("The underlying transport (stdin, chat gateway, etc.) encountered an error.")
    )]
    Transport { message: String },
}

/// Convenience alias for channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

// ── Messages ─────────────────────────────────────────────────────────────

/// A message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub author_id: AuthorId,
    /// Display name used when addressing the author.
    pub author_name: String,
    pub content: String,
    /// Guild (server) the message was posted in; `None` for direct messages.
    pub guild: Option<String>,
}

/// A reply from the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    /// A file attachment with no text.
    File(PathBuf),
}

// ── ChatChannel ──────────────────────────────────────────────────────────

/// One conversation the bot takes part in.
pub trait ChatChannel: EntryDeleter + Send {
    /// The bot's own author id in this channel.
    fn bot_id(&self) -> &AuthorId;

    /// History, newest first.
    fn history(&self) -> ChannelResult<TranscriptCursor>;

    /// Post `message` as the bot.
    fn send(&mut self, message: OutboundMessage) -> ChannelResult<EntryId>;
}

// ── MemoryChannel ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredEntry {
    entry: TranscriptEntry,
    attachment: Option<PathBuf>,
}

/// In-memory channel with an append-only clock and removable entries.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    bot_id: AuthorId,
    guild: Option<String>,
    entries: Vec<StoredEntry>,
    next_position: u64,
}

impl MemoryChannel {
    /// A guild channel in `guild` where the bot is `bot_id`.
    pub fn new(bot_id: AuthorId, guild: impl Into<String>) -> Self {
        Self {
            bot_id,
            guild: Some(guild.into()),
            entries: Vec::new(),
            next_position: 0,
        }
    }

    /// A direct-message channel (no guild).
    pub fn direct(bot_id: AuthorId) -> Self {
        Self {
            bot_id,
            guild: None,
            entries: Vec::new(),
            next_position: 0,
        }
    }

    fn append(&mut self, author_id: AuthorId, content: String, attachment: Option<PathBuf>) -> EntryId {
        let id = EntryId(self.next_position);
        let is_bot = author_id == self.bot_id;
        self.entries.push(StoredEntry {
            entry: TranscriptEntry {
                id,
                author_id,
                is_bot,
                content,
                sequence_position: self.next_position,
            },
            attachment,
        });
        self.next_position += 1;
        id
    }

    /// Record a user message and return it as the transport would deliver it.
    pub fn post(&mut self, author_id: &AuthorId, author_name: &str, content: &str) -> IncomingMessage {
        self.append(author_id.clone(), content.to_string(), None);
        IncomingMessage {
            author_id: author_id.clone(),
            author_name: author_name.to_string(),
            content: content.to_string(),
            guild: self.guild.clone(),
        }
    }

    /// Current transcript, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().map(|s| &s.entry)
    }

    /// Contents of the current transcript, oldest first.
    pub fn contents(&self) -> Vec<&str> {
        self.entries().map(|e| e.content.as_str()).collect()
    }

    /// Attachment of `id`, if it is a file message.
    pub fn attachment(&self, id: EntryId) -> Option<&PathBuf> {
        self.entries
            .iter()
            .find(|s| s.entry.id == id)
            .and_then(|s| s.attachment.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntryDeleter for MemoryChannel {
    fn delete_entry(&mut self, entry: &TranscriptEntry) -> ChannelResult<()> {
        let index = self
            .entries
            .iter()
            .position(|s| s.entry.id == entry.id)
            .ok_or(ChannelError::NotFound {
                entry_id: entry.id.0,
            })?;
        self.entries.remove(index);
        Ok(())
    }
}

impl ChatChannel for MemoryChannel {
    fn bot_id(&self) -> &AuthorId {
        &self.bot_id
    }

    fn history(&self) -> ChannelResult<TranscriptCursor> {
        let snapshot: Vec<TranscriptEntry> =
            self.entries.iter().rev().map(|s| s.entry.clone()).collect();
        Ok(TranscriptCursor::from_newest_first(snapshot))
    }

    fn send(&mut self, message: OutboundMessage) -> ChannelResult<EntryId> {
        let bot = self.bot_id.clone();
        Ok(match message {
            OutboundMessage::Text(text) => self.append(bot, text, None),
            OutboundMessage::File(path) => self.append(bot, String::new(), Some(path)),
        })
    }
}
