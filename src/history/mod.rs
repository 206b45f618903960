//! Conversation history: transcript view, `!delete` parsing and the
//! retraction scan.

pub mod command;
pub mod reconcile;
pub mod transcript;

pub use command::{ENTRIES_PER_ITEM, RetractionRequest, Scope, parse_retraction};
pub use reconcile::{
    EntryKind, HistoryReconciler, RemovalRecord, RetractionOutcome, RetractionSummary,
};
pub use transcript::{AuthorId, EntryDeleter, EntryId, TranscriptCursor, TranscriptEntry};
