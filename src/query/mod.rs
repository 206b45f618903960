//! Directive query pipeline: parse, compile, fetch, normalize, plan ticks.

pub mod axis;
pub mod compile;
pub mod corpus;
pub mod directive;
pub mod normalize;
pub mod pipeline;

pub use axis::tick_step;
pub use compile::{QueryDescriptor, compile};
pub use corpus::{CorpusSeries, CorpusSource, NgramClient, StaticCorpus};
pub use directive::{Directive, OptionKey, parse_directive};
pub use normalize::{NormalizedSeries, RawSeries, normalize};
pub use pipeline::QueryPipeline;
