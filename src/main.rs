//! ngram-bot CLI: n-gram charts for chat, plus a console transport.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ngram_bot::bot::{Bot, Handled};
use ngram_bot::channel::{ChatChannel, MemoryChannel};
use ngram_bot::config::BotConfig;
use ngram_bot::history::{AuthorId, RetractionOutcome};
use ngram_bot::paths::BotPaths;
use ngram_bot::query::{NgramClient, QueryPipeline};
use ngram_bot::render::SvgRenderer;

/// Author id of the bot in the console transport.
const CONSOLE_BOT_ID: &str = "ngram-bot";

#[derive(Parser)]
#[command(name = "ngram-bot", version, about = "Google Books n-gram charts for chat")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/ngram-bot/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the corpus URL a directive compiles to.
    Url {
        /// Directive text, e.g. ".liberty,start=1850".
        directive: String,
    },

    /// Fetch and chart a directive.
    Query {
        /// Directive text, e.g. ".liberty,start=1850".
        directive: String,

        /// Output directory for the chart.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the bot against an in-memory channel fed from stdin.
    ///
    /// Each line is `name: message` (or just `message`, sent as "operator").
    Console {
        /// Guild name; pass --direct to simulate a direct-message channel.
        #[arg(long, default_value = "console")]
        guild: String,

        /// Simulate a direct-message channel (the bot ignores everything).
        #[arg(long)]
        direct: bool,
    },

    /// Manage the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with every default spelled out.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration.
    Show,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = BotPaths::resolve()?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    miette::bail!(
                        "config already exists at {} (use --force to overwrite)",
                        config_path.display()
                    );
                }
                BotConfig::default().save(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
            ConfigAction::Show => {
                let config = BotConfig::load_or_default(&config_path)?;
                let text = toml::to_string_pretty(&config).into_diagnostic()?;
                println!("# {}", config_path.display());
                print!("{text}");
            }
        },

        Commands::Url { directive } => {
            let config = BotConfig::load_or_default(&config_path)?;
            let pipeline = pipeline(&config, chart_dir(&config, &paths, None));
            match pipeline.prepare(&directive) {
                Some((_, query)) => println!("{}", query.url(&config.corpus)),
                None => miette::bail!(
                    "not a directive: must start with '{}'",
                    config.syntax.trigger
                ),
            }
        }

        Commands::Query { directive, out } => {
            let config = BotConfig::load_or_default(&config_path)?;
            let pipeline = pipeline(&config, chart_dir(&config, &paths, out));
            match pipeline.handle_directive(&directive)? {
                Some(artifact) => println!("{}", artifact.path.display()),
                None => miette::bail!(
                    "not a directive: must start with '{}'",
                    config.syntax.trigger
                ),
            }
        }

        Commands::Console { guild, direct } => {
            let config = BotConfig::load_or_default(&config_path)?;
            let out = chart_dir(&config, &paths, None);
            run_console(&config, out, &guild, direct)?;
        }
    }

    Ok(())
}

fn chart_dir(config: &BotConfig, paths: &BotPaths, out: Option<PathBuf>) -> PathBuf {
    out.or_else(|| config.chart.output_dir.clone())
        .unwrap_or_else(|| paths.chart_dir())
}

fn pipeline(config: &BotConfig, out: PathBuf) -> QueryPipeline {
    QueryPipeline::new(
        config.syntax.clone(),
        config.corpus.clone(),
        Box::new(NgramClient::new(config.corpus.clone())),
        Box::new(SvgRenderer::new(out, &config.chart)),
    )
}

fn run_console(config: &BotConfig, out: PathBuf, guild: &str, direct: bool) -> Result<()> {
    let bot_id = AuthorId::new(CONSOLE_BOT_ID);
    let bot = Bot::new(
        config,
        bot_id.clone(),
        Box::new(NgramClient::new(config.corpus.clone())),
        Box::new(SvgRenderer::new(out, &config.chart)),
    );
    let mut channel = if direct {
        MemoryChannel::direct(bot_id)
    } else {
        MemoryChannel::new(bot_id, guild)
    };

    tracing::info!(guild, direct, "listening for queries");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    write!(stdout, "> ").into_diagnostic()?;
    stdout.flush().into_diagnostic()?;

    for line in stdin.lock().lines() {
        let line = line.into_diagnostic()?;
        let line = line.trim_end();
        if line == ":quit" {
            break;
        }
        if line == ":log" {
            for entry in channel.entries() {
                let attachment = channel
                    .attachment(entry.id)
                    .map(|p| format!(" [{}]", p.display()))
                    .unwrap_or_default();
                println!("  #{} {}: {}{attachment}", entry.id, entry.author_id, entry.content);
            }
        } else if !line.is_empty() {
            let (name, text) = line.split_once(": ").unwrap_or(("operator", line));
            let message = channel.post(&AuthorId::new(name), name, text);
            match bot.on_message(&message, &mut channel) {
                Ok(handled) => report(&handled, &channel),
                Err(e) => eprintln!("{:?}", miette::Report::new(e)),
            }
        }
        write!(stdout, "> ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;
    }
    Ok(())
}

fn report(handled: &Handled, channel: &MemoryChannel) {
    match handled {
        Handled::Ignored => {}
        Handled::Chart(artifact) => println!("{}: [chart {}]", channel.bot_id(), artifact.path.display()),
        Handled::QueryFailed(e) => println!("{}: {e}", channel.bot_id()),
        Handled::Retraction(RetractionOutcome::Refused { warning }) => {
            println!("{}: {warning}", channel.bot_id());
        }
        Handled::Retraction(RetractionOutcome::Completed(summary)) => println!(
            "  removed {} message(s) in {:.3}s; {} left in channel",
            summary.removed,
            summary.elapsed.as_secs_f64(),
            channel.len()
        ),
    }
}
