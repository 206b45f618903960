//! Directive parsing: `.term[,option...]` text into a [`Directive`].
//!
//! Parsing is tolerant. Text that is not a directive yields `None`, and an
//! option whose value does not parse is dropped so the compiler's default
//! applies. Options are matched by substring containment, so `start=1850`,
//! `startat1850` and ` start = 1850` all set the start year.

use crate::config::SyntaxConfig;

/// A parsed directive. Unset fields are resolved later by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The message text exactly as received.
    pub raw_text: String,
    /// Search term with spaces replaced by the join character.
    pub search_term: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub smoothing: Option<i32>,
}

impl Directive {
    /// A directive for `search_term` with no option overrides.
    pub fn new(search_term: impl Into<String>) -> Self {
        let search_term = search_term.into();
        Self {
            raw_text: search_term.clone(),
            search_term,
            start_year: None,
            end_year: None,
            smoothing: None,
        }
    }
}

/// Option keys a segment can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Start,
    End,
    Smoothing,
}

/// One row of the option table: the tag looked for in a segment, the
/// value parser, and the field it writes.
struct OptionRule {
    key: OptionKey,
    tag: &'static str,
    parse: fn(&str) -> Option<i32>,
}

/// Scanned in order for every segment; a segment may hit several rows.
const OPTION_TABLE: [OptionRule; 3] = [
    OptionRule {
        key: OptionKey::Start,
        tag: "start",
        parse: parse_int,
    },
    OptionRule {
        key: OptionKey::End,
        tag: "end",
        parse: parse_int,
    },
    OptionRule {
        key: OptionKey::Smoothing,
        tag: "smoothing",
        parse: parse_int,
    },
];

/// Literal that introduces a positional value (`startat1850`).
const AT_SEPARATOR: &str = "at";

fn parse_int(token: &str) -> Option<i32> {
    token.trim().parse().ok()
}

impl OptionKey {
    fn set(self, directive: &mut Directive, value: i32) {
        match self {
            Self::Start => directive.start_year = Some(value),
            Self::End => directive.end_year = Some(value),
            Self::Smoothing => directive.smoothing = Some(value),
        }
    }
}

/// The value token of an option segment.
///
/// The separator (`=` or `at`) that occurs first in the segment wins. The
/// token runs to the next `=`, so `start=1850=x` reads `1850`.
fn option_value(segment: &str) -> Option<&str> {
    let eq = segment.find('=').map(|i| (i, i + 1));
    let at = segment
        .find(AT_SEPARATOR)
        .map(|i| (i, i + AT_SEPARATOR.len()));
    let (_, value_start) = match (eq, at) {
        (Some(e), Some(a)) => e.min(a),
        (Some(e), None) => e,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    segment[value_start..].split('=').next()
}

/// Parse `text` as a directive.
///
/// Returns `None` when the text does not start with the trigger, when the
/// head segment is not trigger-prefixed, or when the search term is empty.
pub fn parse_directive(text: &str, syntax: &SyntaxConfig) -> Option<Directive> {
    if !text.starts_with(syntax.trigger) {
        return None;
    }

    let mut segments = text.split(syntax.separator);
    let head = segments.next()?.strip_prefix(syntax.trigger)?;
    if head.is_empty() {
        return None;
    }

    let mut directive = Directive {
        raw_text: text.to_string(),
        search_term: head.replace(' ', &syntax.join.to_string()),
        start_year: None,
        end_year: None,
        smoothing: None,
    };

    for segment in segments {
        for rule in &OPTION_TABLE {
            if !segment.contains(rule.tag) {
                continue;
            }
            match option_value(segment).and_then(rule.parse) {
                Some(value) => rule.key.set(&mut directive, value),
                None => {
                    tracing::debug!(
                        segment,
                        option = rule.tag,
                        "ignoring malformed directive option"
                    );
                }
            }
        }
    }

    Some(directive)
}
