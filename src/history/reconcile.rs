//! Backward history scan that retracts a requester's directive/response pairs.
//!
//! The scan walks newest → oldest, deleting in scan order. Retraction commands
//! and refusal warnings are swept up for free; directives and chart responses
//! spend budget. Entries from other authors are never touched or counted.

use std::time::{Duration, Instant};

use crate::config::{RetractionConfig, SyntaxConfig};

use super::command::{RetractionRequest, Scope, parse_retraction};
use super::transcript::{AuthorId, EntryDeleter, TranscriptCursor, TranscriptEntry};

/// What a matched entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A prior `!delete` from the requester.
    RetractionCommand,
    /// A prior refusal warning from the bot.
    Warning,
    /// A prior directive from the requester.
    Directive,
    /// Any other bot message (a chart).
    Response,
}

impl EntryKind {
    /// Whether deleting this kind spends budget.
    pub fn counts(self) -> bool {
        matches!(self, Self::Directive | Self::Response)
    }
}

/// One deletion performed (or attempted) by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRecord {
    /// 1-based position in the scan, counting every visited entry.
    pub position: usize,
    pub kind: EntryKind,
    /// Entry content for requester messages, a label for bot messages.
    pub summary: String,
    /// `false` when the delete call failed.
    pub deleted: bool,
}

/// Informational report of a completed scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RetractionSummary {
    pub requester: AuthorId,
    pub scope: Scope,
    /// Entry budget for bounded scans.
    pub requested: Option<u32>,
    /// Entries actually deleted.
    pub removed: usize,
    /// Budget spent (includes failed deletes of counted kinds).
    pub counted: u32,
    /// Delete calls that failed.
    pub failed: usize,
    pub elapsed: Duration,
    pub records: Vec<RemovalRecord>,
}

/// Result of handling a retraction command.
#[derive(Debug, Clone, PartialEq)]
pub enum RetractionOutcome {
    /// Over the ceiling: nothing scanned, `warning` is to be sent once.
    Refused { warning: String },
    Completed(RetractionSummary),
}

/// Scan state. `Scanning` pulls the next entry; the others are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// `remaining` is `None` for unbounded scans.
    Scanning { remaining: Option<u32> },
    /// Bounded budget reached zero.
    Exhausted,
    /// History ran out first.
    Drained,
}

/// Matches transcript entries against a retraction and deletes them.
#[derive(Debug, Clone)]
pub struct HistoryReconciler {
    bot_id: AuthorId,
    syntax: SyntaxConfig,
    config: RetractionConfig,
}

impl HistoryReconciler {
    pub fn new(bot_id: AuthorId, syntax: SyntaxConfig, config: RetractionConfig) -> Self {
        Self {
            bot_id,
            syntax,
            config,
        }
    }

    pub fn config(&self) -> &RetractionConfig {
        &self.config
    }

    /// Classify `entry` for a scan on behalf of `requester`.
    ///
    /// `None` for entries the scan must leave alone.
    pub fn classify(&self, entry: &TranscriptEntry, requester: &AuthorId) -> Option<EntryKind> {
        let by_requester = &entry.author_id == requester;
        let by_bot = entry.author_id == self.bot_id;

        if by_requester && entry.content.starts_with(self.config.command.as_str()) {
            Some(EntryKind::RetractionCommand)
        } else if by_bot && entry.content.contains(self.config.warning_marker.as_str()) {
            Some(EntryKind::Warning)
        } else if by_requester && entry.content.starts_with(self.syntax.trigger) {
            Some(EntryKind::Directive)
        } else if by_bot {
            Some(EntryKind::Response)
        } else {
            None
        }
    }

    /// Transport entry point: parse `command_text` and, if it is a retraction,
    /// carry it out against `history`.
    pub fn handle_retraction<D: EntryDeleter + ?Sized>(
        &self,
        command_text: &str,
        requester_id: &AuthorId,
        requester_name: &str,
        history: TranscriptCursor,
        deleter: &mut D,
    ) -> Option<RetractionOutcome> {
        let request = parse_retraction(command_text, requester_id, requester_name, &self.config)?;
        Some(self.reconcile(&request, history, deleter))
    }

    /// Run `request` against `history`, deleting through `deleter`.
    pub fn reconcile<D: EntryDeleter + ?Sized>(
        &self,
        request: &RetractionRequest,
        history: TranscriptCursor,
        deleter: &mut D,
    ) -> RetractionOutcome {
        let started = Instant::now();

        let requested = match request.scope {
            Scope::Bounded => {
                tracing::info!(
                    requester = %request.requester_name,
                    items = request.items(),
                    entries = request.requested_count,
                    "retraction requested"
                );
                if request.requested_count > self.config.max_entries() {
                    tracing::info!(
                        requester = %request.requester_name,
                        items = request.items(),
                        ceiling = self.config.max_items,
                        "retraction refused: over ceiling"
                    );
                    return RetractionOutcome::Refused {
                        warning: self.config.warning_text(&request.requester_name),
                    };
                }
                Some(request.requested_count)
            }
            Scope::All => {
                tracing::info!(requester = %request.requester_name, "retraction of all history requested");
                None
            }
        };

        let mut scan = Scan::new(self, request, requested);
        for entry in history {
            scan.feed(&entry, deleter);
            if !scan.is_scanning() {
                break;
            }
        }
        let summary = scan.finish(started.elapsed());

        tracing::info!(
            requester = %request.requester_name,
            removed = summary.removed,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "finished retraction"
        );
        RetractionOutcome::Completed(summary)
    }
}

/// Mutable state of one scan.
struct Scan<'a> {
    reconciler: &'a HistoryReconciler,
    request: &'a RetractionRequest,
    requested: Option<u32>,
    state: ScanState,
    position: usize,
    counted: u32,
    records: Vec<RemovalRecord>,
}

impl<'a> Scan<'a> {
    fn new(
        reconciler: &'a HistoryReconciler,
        request: &'a RetractionRequest,
        requested: Option<u32>,
    ) -> Self {
        let state = match requested {
            Some(0) => ScanState::Exhausted,
            remaining => ScanState::Scanning { remaining },
        };
        Self {
            reconciler,
            request,
            requested,
            state,
            position: 0,
            counted: 0,
            records: Vec::new(),
        }
    }

    fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::Scanning { .. })
    }

    /// Advance over one entry.
    fn feed<D: EntryDeleter + ?Sized>(&mut self, entry: &TranscriptEntry, deleter: &mut D) {
        let ScanState::Scanning { remaining } = self.state else {
            return;
        };
        self.position += 1;

        let Some(kind) = self
            .reconciler
            .classify(entry, &self.request.requester_id)
        else {
            return;
        };

        let deleted = match deleter.delete_entry(entry) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    position = self.position,
                    entry = %entry.id,
                    "delete failed, continuing: {e}"
                );
                false
            }
        };

        let summary = match kind {
            EntryKind::RetractionCommand | EntryKind::Directive => entry.content.clone(),
            EntryKind::Warning => "refusal warning".to_string(),
            EntryKind::Response => "chart response".to_string(),
        };

        if kind.counts() {
            self.counted += 1;
            match self.requested {
                Some(requested) => tracing::info!(
                    position = self.position,
                    ?kind,
                    "retracted #{} of {requested}: {summary}",
                    self.counted
                ),
                None => tracing::info!(
                    position = self.position,
                    ?kind,
                    "retracted #{}: {summary}",
                    self.counted
                ),
            }
        } else {
            tracing::info!(position = self.position, ?kind, "swept: {summary}");
        }

        self.records.push(RemovalRecord {
            position: self.position,
            kind,
            summary,
            deleted,
        });

        if kind.counts() {
            if let Some(remaining) = remaining {
                let remaining = remaining.saturating_sub(1);
                self.state = if remaining == 0 {
                    ScanState::Exhausted
                } else {
                    ScanState::Scanning {
                        remaining: Some(remaining),
                    }
                };
            }
        }
    }

    fn finish(mut self, elapsed: Duration) -> RetractionSummary {
        if self.is_scanning() {
            self.state = ScanState::Drained;
        }
        tracing::debug!(state = ?self.state, visited = self.position, "scan ended");
        RetractionSummary {
            requester: self.request.requester_id.clone(),
            scope: self.request.scope,
            requested: self.requested,
            removed: self.records.iter().filter(|r| r.deleted).count(),
            counted: self.counted,
            failed: self.records.iter().filter(|r| !r.deleted).count(),
            elapsed,
            records: self.records,
        }
    }
}
