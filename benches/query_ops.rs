//! Benchmarks for the directive query path and the retraction scan.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ngram_bot::config::{BotConfig, CorpusConfig, SyntaxConfig};
use ngram_bot::history::{
    AuthorId, EntryDeleter, EntryId, HistoryReconciler, RetractionRequest, Scope,
    TranscriptCursor, TranscriptEntry,
};
use ngram_bot::channel::ChannelResult;
use ngram_bot::query::{compile, normalize, parse_directive};

fn bench_parse_compile(c: &mut Criterion) {
    let syntax = SyntaxConfig::default();
    let corpus = CorpusConfig::default();

    c.bench_function("parse_compile_directive", |bench| {
        bench.iter(|| {
            let d = parse_directive(
                black_box(".civil rights movement,start=2050,endat1900,smoothing=-3"),
                &syntax,
            )
            .unwrap();
            black_box(compile(&d, &corpus))
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    // Full 1500..=2019 range.
    let samples: Vec<f64> = (0..520)
        .map(|i| if i % 11 == 0 { 0.0 } else { 1e-8 * f64::from(i % 97 + 1) })
        .collect();

    c.bench_function("normalize_520", |bench| {
        bench.iter(|| black_box(normalize(black_box(&samples), 1500).unwrap()))
    });
}

struct Discard;

impl EntryDeleter for Discard {
    fn delete_entry(&mut self, _entry: &TranscriptEntry) -> ChannelResult<()> {
        Ok(())
    }
}

fn bench_retract_all(c: &mut Criterion) {
    let config = BotConfig::default();
    let reconciler = HistoryReconciler::new(
        AuthorId::new("bot"),
        config.syntax.clone(),
        config.retraction.clone(),
    );
    let authors = ["ada", "bot", "bob"];
    let entries: Vec<TranscriptEntry> = (0..3000u64)
        .rev()
        .map(|i| TranscriptEntry {
            id: EntryId(i),
            author_id: AuthorId::new(authors[(i % 3) as usize]),
            is_bot: i % 3 == 1,
            content: if i % 3 == 0 { ".liberty".into() } else { String::new() },
            sequence_position: i,
        })
        .collect();
    let request = RetractionRequest {
        requester_id: AuthorId::new("ada"),
        requester_name: "ada".into(),
        requested_count: 0,
        scope: Scope::All,
    };

    c.bench_function("retract_all_3000", |bench| {
        bench.iter(|| {
            let cursor = TranscriptCursor::from_newest_first(entries.clone());
            black_box(reconciler.reconcile(&request, cursor, &mut Discard))
        })
    });
}

criterion_group!(benches, bench_parse_compile, bench_normalize, bench_retract_all);
criterion_main!(benches);
