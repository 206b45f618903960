// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ngram-bot
//!
//! A chat bot that answers `.term` directives with a normalized usage curve
//! from the Google Books n-gram corpus, and retracts a requester's own
//! directive/response pairs on `!delete`.
//!
//! ## Architecture
//!
//! - **Query pipeline** (`query`): directive parser → request compiler →
//!   corpus fetch → series normalizer → tick-step planner
//! - **Rendering** (`render`): SVG line charts behind the `Renderer` seam
//! - **History** (`history`): `!delete` parsing and the bounded backward scan
//! - **Transport** (`channel`, `bot`): the `ChatChannel` seam and dispatch
//!
//! ## Library usage
//!
//! ```no_run
//! use ngram_bot::config::BotConfig;
//! use ngram_bot::query::{NgramClient, QueryPipeline};
//! use ngram_bot::render::SvgRenderer;
//!
//! let config = BotConfig::default();
//! let pipeline = QueryPipeline::new(
//!     config.syntax.clone(),
//!     config.corpus.clone(),
//!     Box::new(NgramClient::new(config.corpus.clone())),
//!     Box::new(SvgRenderer::new("/tmp", &config.chart)),
//! );
//! let chart = pipeline.handle_directive(".liberty,start=1850,smoothing=3").unwrap();
//! ```

pub mod bot;
pub mod channel;
pub mod config;
pub mod error;
pub mod history;
pub mod paths;
pub mod query;
pub mod render;
