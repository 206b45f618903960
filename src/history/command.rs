//! `!delete [n|all]` command parsing.

use std::num::IntErrorKind;

use crate::config::RetractionConfig;

use super::transcript::AuthorId;

/// Items retracted when the command gives no usable count.
const DEFAULT_ITEMS: u32 = 1;

/// Transcript entries per item: one directive plus its one response.
pub const ENTRIES_PER_ITEM: u32 = 2;

/// How far back a retraction reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Up to a caller-given count, capped by the configured ceiling.
    Bounded,
    /// Every matching entry in the available history.
    All,
}

/// A parsed retraction command. Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetractionRequest {
    pub requester_id: AuthorId,
    /// Display name used in replies.
    pub requester_name: String,
    /// Requested transcript entries (twice the item count). Unused for `All`.
    pub requested_count: u32,
    pub scope: Scope,
}

impl RetractionRequest {
    /// The user-facing item count.
    pub fn items(&self) -> u32 {
        self.requested_count / ENTRIES_PER_ITEM
    }
}

/// Parse `text` as a retraction command from `requester_id`.
///
/// `None` when the text does not start with the command. The `all` keyword
/// anywhere in the text selects [`Scope::All`]. Otherwise the remainder is an
/// item count; a missing, non-numeric or zero count means one item. A count
/// too large to represent saturates, so it still lands above the ceiling.
pub fn parse_retraction(
    text: &str,
    requester_id: &AuthorId,
    requester_name: &str,
    config: &RetractionConfig,
) -> Option<RetractionRequest> {
    let rest = text.strip_prefix(config.command.as_str())?;

    let (scope, items) = if text.contains(config.all_keyword.as_str()) {
        (Scope::All, 0)
    } else {
        let items = match rest.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
            _ => DEFAULT_ITEMS,
        };
        (Scope::Bounded, items)
    };

    Some(RetractionRequest {
        requester_id: requester_id.clone(),
        requester_name: requester_name.to_string(),
        requested_count: items.saturating_mul(ENTRIES_PER_ITEM),
        scope,
    })
}
