//! Message dispatch: routes incoming chat messages to the query pipeline or
//! the history reconciler, and posts the replies.

use crate::channel::{ChatChannel, IncomingMessage, OutboundMessage};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::history::{AuthorId, HistoryReconciler, RetractionOutcome};
use crate::query::{CorpusSource, QueryPipeline};
use crate::render::{ChartArtifact, Renderer};

/// What `on_message` did with a message.
#[derive(Debug)]
pub enum Handled {
    /// Not for us: own message, direct message, or not a command.
    Ignored,
    /// A chart was posted.
    Chart(ChartArtifact),
    /// The directive failed; an error reply was posted.
    QueryFailed(BotError),
    /// A retraction ran (or was refused with a warning reply).
    Retraction(RetractionOutcome),
}

/// The bot: one pipeline, one reconciler, no state between messages.
#[derive(Debug)]
pub struct Bot {
    pipeline: QueryPipeline,
    reconciler: HistoryReconciler,
}

impl Bot {
    pub fn new(
        config: &BotConfig,
        bot_id: AuthorId,
        source: Box<dyn CorpusSource>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            pipeline: QueryPipeline::new(
                config.syntax.clone(),
                config.corpus.clone(),
                source,
                renderer,
            ),
            reconciler: HistoryReconciler::new(
                bot_id,
                config.syntax.clone(),
                config.retraction.clone(),
            ),
        }
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn reconciler(&self) -> &HistoryReconciler {
        &self.reconciler
    }

    /// Handle one incoming message on `channel`.
    ///
    /// Only transport failures (reading history, posting a reply) are
    /// returned as errors; query failures are answered in-channel.
    pub fn on_message(
        &self,
        message: &IncomingMessage,
        channel: &mut dyn ChatChannel,
    ) -> BotResult<Handled> {
        if &message.author_id == channel.bot_id() || message.guild.is_none() {
            return Ok(Handled::Ignored);
        }

        let text = message.content.as_str();
        if text.starts_with(self.pipeline.syntax().trigger) {
            return self.answer_directive(text, channel);
        }

        if text.starts_with(self.reconciler.config().command.as_str()) {
            let history = channel.history()?;
            let Some(outcome) = self.reconciler.handle_retraction(
                text,
                &message.author_id,
                &message.author_name,
                history,
                &mut *channel,
            ) else {
                return Ok(Handled::Ignored);
            };
            if let RetractionOutcome::Refused { warning } = &outcome {
                channel.send(OutboundMessage::Text(warning.clone()))?;
            }
            return Ok(Handled::Retraction(outcome));
        }

        Ok(Handled::Ignored)
    }

    fn answer_directive(&self, text: &str, channel: &mut dyn ChatChannel) -> BotResult<Handled> {
        match self.pipeline.handle_directive(text) {
            Ok(Some(artifact)) => {
                channel.send(OutboundMessage::File(artifact.path.clone()))?;
                Ok(Handled::Chart(artifact))
            }
            Ok(None) => Ok(Handled::Ignored),
            Err(e) => {
                tracing::error!(directive = text, "query failed: {e}");
                channel.send(OutboundMessage::Text(format!("Could not chart that: {e}")))?;
                Ok(Handled::QueryFailed(e))
            }
        }
    }
}
