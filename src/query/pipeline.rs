//! Directive → chart orchestration.

use std::time::Instant;

use crate::config::{CorpusConfig, SyntaxConfig};
use crate::error::BotResult;
use crate::render::{ChartArtifact, ChartRequest, Renderer};

use super::axis::tick_step;
use super::compile::{QueryDescriptor, compile};
use super::corpus::CorpusSource;
use super::directive::{Directive, parse_directive};

/// Runs parse → compile → fetch → normalize → step → render.
pub struct QueryPipeline {
    syntax: SyntaxConfig,
    corpus: CorpusConfig,
    source: Box<dyn CorpusSource>,
    renderer: Box<dyn Renderer>,
}

impl QueryPipeline {
    pub fn new(
        syntax: SyntaxConfig,
        corpus: CorpusConfig,
        source: Box<dyn CorpusSource>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            syntax,
            corpus,
            source,
            renderer,
        }
    }

    pub fn syntax(&self) -> &SyntaxConfig {
        &self.syntax
    }

    pub fn corpus(&self) -> &CorpusConfig {
        &self.corpus
    }

    /// Parse and compile `text` without touching the network.
    pub fn prepare(&self, text: &str) -> Option<(Directive, QueryDescriptor)> {
        let directive = parse_directive(text, &self.syntax)?;
        let query = compile(&directive, &self.corpus);
        Some((directive, query))
    }

    /// Answer one message.
    ///
    /// `Ok(None)` when `text` is not a directive; `Ok(Some(_))` with exactly
    /// one artifact on success. Fetch, normalization and render failures are
    /// returned and no artifact is produced.
    pub fn handle_directive(&self, text: &str) -> BotResult<Option<ChartArtifact>> {
        let Some((_, query)) = self.prepare(text) else {
            return Ok(None);
        };
        self.plot(&query).map(Some)
    }

    /// Fetch, normalize and render a compiled query.
    pub fn plot(&self, query: &QueryDescriptor) -> BotResult<ChartArtifact> {
        let started = Instant::now();
        tracing::info!(
            term = %query.search_term,
            start = query.start_year,
            end = query.end_year,
            smoothing = query.smoothing,
            "searching corpus"
        );

        let raw = self.source.fetch_first(query)?;
        let normalized = raw.normalize()?;
        let request = ChartRequest {
            values: normalized.values,
            min_year: normalized.min_year,
            max_year: normalized.max_year,
            search_term: query.search_term.clone(),
            start_year: query.start_year,
            end_year: query.end_year,
            step: tick_step(query.start_year, query.end_year),
        };
        let artifact = self.renderer.render(&request)?;

        tracing::info!(
            term = %query.search_term,
            min_year = request.min_year,
            max_year = request.max_year,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "completed query"
        );
        Ok(artifact)
    }
}

impl std::fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("syntax", &self.syntax)
            .field("corpus", &self.corpus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{BotError, QueryError, RenderResult};
    use crate::query::corpus::StaticCorpus;

    /// Captures requests instead of drawing.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<ChartRequest>>>);

    impl Renderer for Capture {
        fn render(&self, request: &ChartRequest) -> RenderResult<ChartArtifact> {
            self.0.lock().unwrap().push(request.clone());
            Ok(ChartArtifact {
                path: "chart.svg".into(),
                media_type: "image/svg+xml",
            })
        }
    }

    fn pipeline(corpus: StaticCorpus) -> (QueryPipeline, Capture) {
        let capture = Capture::default();
        let pipeline = QueryPipeline::new(
            SyntaxConfig::default(),
            CorpusConfig::default(),
            Box::new(corpus),
            Box::new(capture.clone()),
        );
        (pipeline, capture)
    }

    #[test]
    fn non_directive_is_silent() {
        let (pipeline, capture) = pipeline(StaticCorpus::new());
        assert!(pipeline.handle_directive("hello there").unwrap().is_none());
        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn directive_produces_one_chart() {
        let corpus = StaticCorpus::new().with_series("liberty", vec![0.0, 2.0, 4.0, 8.0]);
        let (pipeline, capture) = pipeline(corpus);
        let artifact = pipeline
            .handle_directive(".liberty,start=1800,end=1803")
            .unwrap();
        assert!(artifact.is_some());

        let requests = capture.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let r = &requests[0];
        assert_eq!(r.values, vec![0.0, 1.0, 2.0, 4.0]);
        assert_eq!((r.min_year, r.max_year), (1801, 1803));
        assert_eq!((r.start_year, r.end_year, r.step), (1800, 1803, 3));
        assert_eq!(r.search_term, "liberty");
    }

    #[test]
    fn all_zero_series_aborts_without_chart() {
        let corpus = StaticCorpus::new().with_series("liberty", vec![0.0; 220]);
        let (pipeline, capture) = pipeline(corpus);
        let err = pipeline.handle_directive(".liberty").unwrap_err();
        assert!(matches!(
            err,
            BotError::Query(QueryError::EmptyOrAllZeroSeries)
        ));
        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_term_aborts_without_chart() {
        let (pipeline, capture) = pipeline(StaticCorpus::new());
        let err = pipeline.handle_directive(".zzxq").unwrap_err();
        assert!(matches!(err, BotError::Query(QueryError::NoSeries { .. })));
        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn prepare_compiles_without_fetching() {
        let (pipeline, _) = pipeline(StaticCorpus::new());
        let (directive, query) = pipeline.prepare(".new york,start=2050,end=1900").unwrap();
        assert_eq!(directive.search_term, "new+york");
        assert_eq!((query.start_year, query.end_year), (1900, 2019));
    }
}
