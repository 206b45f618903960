//! Request compilation: resolve a [`Directive`] into a [`QueryDescriptor`].
//!
//! Defaults and clamping run in a fixed order, and the order is observable:
//! the swap happens before either side is range-checked, so an inverted
//! request like `start=2050,end=1900` becomes `(1900, 2019)`, and an end
//! below the corpus floor is reset to the default *end*, not the start.

use url::form_urlencoded;

use crate::config::CorpusConfig;

use super::directive::Directive;

/// A fully resolved corpus query.
///
/// Invariant: `min_year <= start_year <= end_year <= max_year` and
/// `smoothing >= 0` for the bounds it was compiled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub search_term: String,
    pub start_year: i32,
    pub end_year: i32,
    pub smoothing: i32,
}

impl QueryDescriptor {
    /// Number of yearly samples the corpus returns for this range.
    pub fn year_count(&self) -> usize {
        (self.end_year - self.start_year + 1) as usize
    }

    /// The query string sent to the corpus endpoint.
    ///
    /// Words stay joined by `+`; everything else reserved is percent-encoded.
    pub fn query_string(&self, corpus: &CorpusConfig) -> String {
        let content: Vec<String> = self
            .search_term
            .split('+')
            .map(|word| form_urlencoded::byte_serialize(word.as_bytes()).collect())
            .collect();
        format!(
            "content={}&year_start={}&year_end={}&corpus={}&smoothing={}&case_insensitive={}",
            content.join("+"),
            self.start_year,
            self.end_year,
            corpus.corpus_id,
            self.smoothing,
            corpus.case_insensitive,
        )
    }

    /// Full request URL: `<endpoint>?<query string>`.
    pub fn url(&self, corpus: &CorpusConfig) -> String {
        format!("{}?{}", corpus.endpoint, self.query_string(corpus))
    }
}

impl From<&QueryDescriptor> for Directive {
    fn from(query: &QueryDescriptor) -> Self {
        Self {
            raw_text: query.search_term.clone(),
            search_term: query.search_term.clone(),
            start_year: Some(query.start_year),
            end_year: Some(query.end_year),
            smoothing: Some(query.smoothing),
        }
    }
}

/// Resolve `directive` against the corpus bounds in `corpus`.
pub fn compile(directive: &Directive, corpus: &CorpusConfig) -> QueryDescriptor {
    let mut start = directive.start_year.unwrap_or(corpus.default_start);
    let mut end = directive.end_year.unwrap_or(corpus.default_end);
    let mut smoothing = directive.smoothing.unwrap_or(0);

    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    if !corpus.in_bounds(end) {
        end = corpus.default_end;
    }
    if smoothing < 0 {
        smoothing = -smoothing;
    }
    if !corpus.in_bounds(start) {
        start = corpus.default_start;
    }
    // A start below the floor with an end between the floor and the default
    // start leaves the pair inverted after the reset above.
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    QueryDescriptor {
        search_term: directive.search_term.clone(),
        start_year: start,
        end_year: end,
        smoothing,
    }
}
