//! Corpus access: trait + HTTP and in-memory implementations.
//!
//! `CorpusSource` is the one suspension point of a directive: a single blocking
//! read keyed by the compiled query. The HTTP client enforces a timeout on its
//! `ureq` agent; the fetch is otherwise not cancellable.
//! - `NgramClient` queries the Google Books n-gram JSON endpoint.
//! - `StaticCorpus` serves canned series for tests and offline use.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::CorpusConfig;
use crate::error::{QueryError, QueryResult};

use super::compile::QueryDescriptor;
use super::normalize::RawSeries;

/// Maximum response body size (4 MB). A full 1500–2019 series is ~10 KB.
const MAX_RESPONSE_SIZE: usize = 4 * 1024 * 1024;

/// One element of the corpus JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSeries {
    /// The n-gram as the corpus spells it (e.g. `"liberty (All)"`).
    #[serde(default)]
    pub ngram: String,
    /// One sample per year of the requested range.
    pub timeseries: Vec<f64>,
}

/// Decode a corpus response body.
pub fn decode_response(body: &str) -> QueryResult<Vec<CorpusSeries>> {
    serde_json::from_str(body).map_err(|e| QueryError::Decode {
        message: e.to_string(),
    })
}

/// Source of corpus series.
pub trait CorpusSource: Send + Sync {
    /// Fetch every series the corpus returns for `query`, in corpus order.
    fn fetch(&self, query: &QueryDescriptor) -> QueryResult<Vec<CorpusSeries>>;

    /// Fetch and keep the first series, dated from the query's start year.
    fn fetch_first(&self, query: &QueryDescriptor) -> QueryResult<RawSeries> {
        let series = self
            .fetch(query)?
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::NoSeries {
                term: query.search_term.clone(),
            })?;
        if series.timeseries.len() != query.year_count() {
            tracing::debug!(
                expected = query.year_count(),
                actual = series.timeseries.len(),
                ngram = %series.ngram,
                "corpus series length differs from requested range"
            );
        }
        Ok(RawSeries::new(query.start_year, series.timeseries))
    }
}

// ── NgramClient ─────────────────────────────────────────────────────────

/// HTTP client for the n-gram JSON endpoint.
pub struct NgramClient {
    corpus: CorpusConfig,
    agent: ureq::Agent,
}

impl NgramClient {
    pub fn new(corpus: CorpusConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(corpus.timeout()).build();
        Self { corpus, agent }
    }
}

impl std::fmt::Debug for NgramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NgramClient")
            .field("endpoint", &self.corpus.endpoint)
            .field("corpus_id", &self.corpus.corpus_id)
            .finish()
    }
}

impl CorpusSource for NgramClient {
    fn fetch(&self, query: &QueryDescriptor) -> QueryResult<Vec<CorpusSeries>> {
        let url = query.url(&self.corpus);
        tracing::debug!(%url, "fetching corpus series");

        match self.agent.get(&url).call() {
            Ok(response) => {
                let body = response.into_string().map_err(|e| QueryError::Fetch {
                    url: url.clone(),
                    message: format!("failed to read body: {e}"),
                })?;
                if body.len() > MAX_RESPONSE_SIZE {
                    return Err(QueryError::Fetch {
                        url,
                        message: format!("response too large: {} bytes", body.len()),
                    });
                }
                decode_response(&body)
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                Err(QueryError::Fetch {
                    url,
                    message: format!("HTTP {code}: {preview}"),
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(QueryError::Fetch {
                url,
                message: transport.to_string(),
            }),
        }
    }
}

// ── StaticCorpus ────────────────────────────────────────────────────────

/// In-memory corpus keyed by search term. Records every query it serves.
#[derive(Debug, Default)]
pub struct StaticCorpus {
    series: HashMap<String, Vec<f64>>,
    requests: Mutex<Vec<QueryDescriptor>>,
}

impl StaticCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register samples for `term` (already join-normalized, e.g. `"new+york"`).
    pub fn with_series(mut self, term: impl Into<String>, samples: Vec<f64>) -> Self {
        self.series.insert(term.into(), samples);
        self
    }

    /// Queries served so far, oldest first.
    pub fn requests(&self) -> Vec<QueryDescriptor> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl CorpusSource for StaticCorpus {
    fn fetch(&self, query: &QueryDescriptor) -> QueryResult<Vec<CorpusSeries>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(query.clone());
        }
        Ok(self
            .series
            .get(&query.search_term)
            .map(|samples| CorpusSeries {
                ngram: query.search_term.clone(),
                timeseries: samples.clone(),
            })
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(term: &str, start: i32, end: i32) -> QueryDescriptor {
        QueryDescriptor {
            search_term: term.into(),
            start_year: start,
            end_year: end,
            smoothing: 0,
        }
    }

    #[test]
    fn decode_corpus_array() {
        let body = r#"[
            {"ngram": "liberty (All)", "parent": "", "type": "CASE_INSENSITIVE", "timeseries": [0.0, 1.5e-6, 3e-6]},
            {"ngram": "Liberty", "parent": "liberty (All)", "type": "CASE_SENSITIVE", "timeseries": [0.0, 1e-6, 2e-6]}
        ]"#;
        let series = decode_response(body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].ngram, "liberty (All)");
        assert_eq!(series[0].timeseries, vec![0.0, 1.5e-6, 3e-6]);
    }

    #[test]
    fn decode_empty_array() {
        assert!(decode_response("[]").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_non_array() {
        assert!(matches!(
            decode_response(r#"{"error": "bad request"}"#),
            Err(QueryError::Decode { .. })
        ));
        assert!(matches!(
            decode_response("<html>"),
            Err(QueryError::Decode { .. })
        ));
    }

    #[test]
    fn fetch_first_dates_from_query_start() {
        let corpus = StaticCorpus::new().with_series("liberty", vec![1.0, 2.0, 3.0]);
        let raw = corpus.fetch_first(&query("liberty", 1900, 1902)).unwrap();
        assert_eq!(raw.start_year, 1900);
        assert_eq!(raw.samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(corpus.requests().len(), 1);
    }

    #[test]
    fn fetch_first_without_series() {
        let corpus = StaticCorpus::new();
        assert!(matches!(
            corpus.fetch_first(&query("zzxq", 1900, 1902)),
            Err(QueryError::NoSeries { .. })
        ));
    }

    #[test]
    fn unreachable_endpoint_is_a_fetch_error() {
        let client = NgramClient::new(CorpusConfig {
            endpoint: "http://127.0.0.1:1/ngrams/json".into(),
            timeout_secs: 1,
            ..Default::default()
        });
        assert!(matches!(
            client.fetch(&query("liberty", 1900, 1902)),
            Err(QueryError::Fetch { .. })
        ));
    }
}
