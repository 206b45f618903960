//! End-to-end tests for ngram-bot.
//!
//! These drive the bot through an in-memory channel: directives are answered
//! with charts rendered from a static corpus, and `!delete` commands retract
//! from the resulting transcript.

use ngram_bot::bot::{Bot, Handled};
use ngram_bot::channel::{ChatChannel, MemoryChannel};
use ngram_bot::config::BotConfig;
use ngram_bot::error::{BotError, QueryError};
use ngram_bot::history::{AuthorId, RetractionOutcome, Scope};
use ngram_bot::query::{QueryPipeline, StaticCorpus, tick_step};
use ngram_bot::render::SvgRenderer;

const BOT: &str = "bot";

fn corpus() -> StaticCorpus {
    // 1800..=2019 for the default range; a short one for explicit ranges.
    let mut long: Vec<f64> = (0..220).map(|i| 1e-7 * f64::from(i % 37 + 1)).collect();
    long[0] = 0.0;
    StaticCorpus::new()
        .with_series("liberty", long)
        .with_series("civil+rights", vec![0.0, 2e-8, 4e-8, 8e-8])
        .with_series("silence", vec![0.0; 4])
}

fn setup(dir: &std::path::Path) -> (Bot, MemoryChannel) {
    let config = BotConfig::default();
    let bot = Bot::new(
        &config,
        AuthorId::new(BOT),
        Box::new(corpus()),
        Box::new(SvgRenderer::new(dir, &config.chart)),
    );
    (bot, MemoryChannel::new(AuthorId::new(BOT), "guild"))
}

fn say(bot: &Bot, channel: &mut MemoryChannel, who: &str, text: &str) -> Handled {
    let message = channel.post(&AuthorId::new(who), who, text);
    bot.on_message(&message, channel).unwrap()
}

#[test]
fn directive_renders_normalized_chart() {
    let dir = tempfile::TempDir::new().unwrap();
    let (bot, mut channel) = setup(dir.path());

    let handled = say(&bot, &mut channel, "ada", ".civil rights,start=1800,end=1803");
    let Handled::Chart(artifact) = handled else {
        panic!("expected a chart, got {handled:?}");
    };
    let svg = std::fs::read_to_string(&artifact.path).unwrap();
    assert!(svg.contains("\"civil+rights\""));
    assert!(svg.contains(">1800</text>"));

    let reply = channel.entries().last().unwrap();
    assert_eq!(&reply.author_id, channel.bot_id());
    assert_eq!(channel.attachment(reply.id), Some(&artifact.path));
}

#[test]
fn default_range_uses_full_series() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = BotConfig::default();
    let pipeline = QueryPipeline::new(
        config.syntax.clone(),
        config.corpus.clone(),
        Box::new(corpus()),
        Box::new(SvgRenderer::new(dir.path(), &config.chart)),
    );
    let (_, query) = pipeline.prepare(".liberty").unwrap();
    assert_eq!((query.start_year, query.end_year, query.smoothing), (1800, 2019, 0));
    assert_eq!(query.year_count(), 220);
    assert_eq!(tick_step(query.start_year, query.end_year), 25);
    assert!(pipeline.handle_directive(".liberty").unwrap().is_some());
}

#[test]
fn all_zero_series_is_reported_not_charted() {
    let dir = tempfile::TempDir::new().unwrap();
    let (bot, mut channel) = setup(dir.path());

    let handled = say(&bot, &mut channel, "ada", ".silence,start=1800,end=1803");
    assert!(matches!(
        handled,
        Handled::QueryFailed(BotError::Query(QueryError::EmptyOrAllZeroSeries))
    ));
    assert!(!dir.path().join("pic.svg").exists());
}

#[test]
fn conversation_then_bounded_retraction() {
    let dir = tempfile::TempDir::new().unwrap();
    let (bot, mut channel) = setup(dir.path());

    say(&bot, &mut channel, "ada", ".liberty");
    say(&bot, &mut channel, "bob", ".liberty");
    say(&bot, &mut channel, "ada", ".civil rights,start=1800,end=1803");
    say(&bot, &mut channel, "bob", "nice chart");
    assert_eq!(channel.len(), 7);

    let handled = say(&bot, &mut channel, "ada", "!delete");
    let Handled::Retraction(RetractionOutcome::Completed(summary)) = handled else {
        panic!("expected a completed retraction, got {handled:?}");
    };
    assert_eq!(summary.scope, Scope::Bounded);
    // The command itself, ada's last chart and ada's last directive.
    assert_eq!(summary.removed, 3);
    assert_eq!(summary.counted, 2);
    assert_eq!(
        channel.contents(),
        vec![".liberty", "", ".liberty", "", "nice chart"]
    );
}

#[test]
fn refused_retraction_then_allowed_one_sweeps_the_warning() {
    let dir = tempfile::TempDir::new().unwrap();
    let (bot, mut channel) = setup(dir.path());

    say(&bot, &mut channel, "ada", ".liberty");
    let handled = say(&bot, &mut channel, "ada", "!delete 4");
    assert!(matches!(
        handled,
        Handled::Retraction(RetractionOutcome::Refused { .. })
    ));
    // Directive, chart, command, one warning.
    assert_eq!(channel.len(), 4);

    let handled = say(&bot, &mut channel, "ada", "!delete 1");
    let Handled::Retraction(RetractionOutcome::Completed(summary)) = handled else {
        panic!("expected a completed retraction, got {handled:?}");
    };
    assert_eq!(summary.counted, 2);
    assert!(channel.is_empty(), "left: {:?}", channel.contents());
}

#[test]
fn retract_all_leaves_other_people_alone() {
    let dir = tempfile::TempDir::new().unwrap();
    let (bot, mut channel) = setup(dir.path());

    for _ in 0..5 {
        say(&bot, &mut channel, "ada", ".liberty");
        say(&bot, &mut channel, "bob", "hm");
    }
    say(&bot, &mut channel, "bob", ".liberty");

    let handled = say(&bot, &mut channel, "ada", "!delete all");
    let Handled::Retraction(RetractionOutcome::Completed(summary)) = handled else {
        panic!("expected a completed retraction, got {handled:?}");
    };
    assert_eq!(summary.scope, Scope::All);
    // Bot replies are swept regardless of who asked for them.
    assert_eq!(summary.removed, 1 + 5 * 2 + 1);
    let mut expected = vec!["hm"; 5];
    expected.push(".liberty");
    assert_eq!(channel.contents(), expected);
}
