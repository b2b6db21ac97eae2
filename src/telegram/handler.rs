use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::future::BoxFuture;
use teloxide::{
    dispatching::Dispatcher,
    error_handlers::ErrorHandler,
    prelude::*,
    types::{ChatAction, Me, Message, ParseMode},
    update_listeners,
    utils::command::BotCommands,
};
use tokio::time::{sleep, Instant};

use crate::{
    config::AppConfig,
    detector::{self, AnalysisError, ModelContext},
    infrastructure::shutdown::ShutdownListener,
};

use super::{
    render,
    types::{AppState, BotResult, Command},
};

pub struct TelegramService {
    bot: Bot,
    state: Arc<AppState>,
}

/// Logs polling failures; the dispatcher keeps polling after each one.
struct ListenerErrorLogger;

impl ErrorHandler<teloxide::RequestError> for ListenerErrorLogger {
    fn handle_error(self: Arc<Self>, error: teloxide::RequestError) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            match &error {
                teloxide::RequestError::Network(source) => {
                    let req_err = source.as_ref();
                    tracing::warn!(
                        target: "telegram",
                        timeout = req_err.is_timeout(),
                        connect = req_err.is_connect(),
                        error = %error,
                        "Telegram polling network failure"
                    );
                }
                _ => {
                    tracing::error!(target: "telegram", error = %error, "update listener error");
                }
            }
        })
    }
}

impl TelegramService {
    pub fn new(bot: Bot, config: Arc<AppConfig>, models: ModelContext) -> Self {
        let state = Arc::new(AppState { config, models });
        Self { bot, state }
    }

    pub async fn run(&self, mut shutdown: ShutdownListener) -> Result<()> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        let me = self.bot.get_me().await?;
        if let Some(expected_username) = &self.state.config.bot_username {
            if me.username.as_deref() != Some(expected_username.as_str()) {
                tracing::warn!(
                    target: "telegram",
                    expected = expected_username.as_str(),
                    actual = ?me.username,
                    "BOT_USERNAME does not match the connected bot account"
                );
            }
        }
        tracing::info!(
            target: "telegram",
            bot_id = me.id.0,
            username = ?me.username,
            "connected to Telegram"
        );

        let handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(Self::on_command),
            )
            .branch(dptree::endpoint(Self::on_plain_message));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.state.clone()])
            .default_handler(|update| async move {
                tracing::debug!(target: "telegram", ?update, "unhandled update");
            })
            .build();

        let listener = update_listeners::polling_default(self.bot.clone()).await;
        let shutdown_token = dispatcher.shutdown_token();
        let mut dispatcher_future = Box::pin(
            dispatcher.dispatch_with_listener(listener, Arc::new(ListenerErrorLogger)),
        );
        let mut dispatcher_finished = false;

        tokio::select! {
            _ = shutdown.notified() => {
                tracing::info!(target: "telegram", "stopping dispatcher");
                if let Ok(wait) = shutdown_token.shutdown() {
                    wait.await;
                }
            }
            _ = &mut dispatcher_future => {
                dispatcher_finished = true;
                tracing::info!(target: "telegram", "dispatcher finished");
            }
        }

        if !dispatcher_finished {
            dispatcher_future.await;
        }

        Ok(())
    }

    async fn on_command(
        bot: Bot,
        msg: Message,
        cmd: Command,
        state: Arc<AppState>,
    ) -> BotResult<()> {
        match cmd {
            Command::Start => {
                bot.send_message(msg.chat.id, render::intro())
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            Command::Help => {
                bot.send_message(msg.chat.id, Command::descriptions().to_string())
                    .await?;
            }
            Command::Analyze(text) => {
                Self::respond_with_analysis(&bot, &msg, &text, &state).await?;
            }
            Command::Ping => {
                let start = Instant::now();
                let sent = bot.send_message(msg.chat.id, "Measuring...").await?;
                let latency_secs = start.elapsed().as_secs_f64();
                bot.edit_message_text(
                    msg.chat.id,
                    sent.id,
                    format!("Pong! Round trip: {:.3}s", latency_secs),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn on_plain_message(
        bot: Bot,
        msg: Message,
        me: Me,
        state: Arc<AppState>,
    ) -> BotResult<()> {
        let text = render::article_text(&msg).unwrap_or_default();
        let own_username = me
            .user
            .username
            .as_deref()
            .or(state.config.bot_username.as_deref());

        match plain_action(text, msg.chat.is_private(), own_username) {
            PlainAction::Analyze(article) => {
                Self::respond_with_analysis(&bot, &msg, article, &state).await
            }
            PlainAction::Help => {
                bot.send_message(msg.chat.id, Command::descriptions().to_string())
                    .await?;
                Ok(())
            }
            PlainAction::Ignore => Ok(()),
        }
    }

    async fn respond_with_analysis(
        bot: &Bot,
        msg: &Message,
        text: &str,
        state: &AppState,
    ) -> BotResult<()> {
        let started = Instant::now();
        let outcome = detector::analyze(text, &state.models);

        if let Err(AnalysisError::EmptyInput) = outcome {
            bot.send_message(msg.chat.id, render::EMPTY_INPUT_WARNING)
                .await?;
            return Ok(());
        }

        bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
        sleep(state.config.presentation.result_delay).await;

        match outcome {
            Ok(analysis) => {
                let completed_at = Utc::now();
                tracing::info!(
                    target: "detector",
                    chat_id = msg.chat.id.0,
                    verdict = %analysis.verdict,
                    input_chars = analysis.input_chars,
                    delay_ms = (completed_at - analysis.classified_at).num_milliseconds(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "article analyzed"
                );
                bot.send_message(
                    msg.chat.id,
                    render::analysis(&analysis, completed_at, state.config.timezone),
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }
            Err(err) => {
                tracing::error!(
                    target: "detector",
                    chat_id = msg.chat.id.0,
                    error = %err,
                    "article analysis failed"
                );
                bot.send_message(msg.chat.id, render::FAILURE_MESSAGE)
                    .await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum PlainAction<'a> {
    Analyze(&'a str),
    Help,
    Ignore,
}

/// A leading `/name[@bot]` token and the text after it.
#[derive(Debug, PartialEq)]
struct CommandText<'a> {
    name: &'a str,
    target: Option<&'a str>,
    rest: &'a str,
}

fn split_command(text: &str) -> Option<CommandText<'_>> {
    let body = text.trim_start().strip_prefix('/')?;
    let (head, rest) = match body.find(char::is_whitespace) {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, ""),
    };
    let (name, target) = match head.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (head, None),
    };
    Some(CommandText {
        name,
        target,
        rest: rest.trim_start(),
    })
}

/// Decides what a message the command filter did not claim should trigger.
///
/// `/analyze` followed by a newline is not recognized by the command parser,
/// so it arrives here too. Commands addressed to another bot are ignored, and
/// outside private chats only explicit `/analyze` is acted on.
fn plain_action<'a>(
    text: &'a str,
    is_private: bool,
    own_username: Option<&str>,
) -> PlainAction<'a> {
    let Some(command) = split_command(text) else {
        return if is_private {
            PlainAction::Analyze(text)
        } else {
            PlainAction::Ignore
        };
    };

    if let Some(target) = command.target {
        let ours = own_username.is_some_and(|own| own.eq_ignore_ascii_case(target));
        if !ours {
            return PlainAction::Ignore;
        }
    }
    if command.name.eq_ignore_ascii_case("analyze") {
        PlainAction::Analyze(command.rest)
    } else if is_private {
        PlainAction::Help
    } else {
        PlainAction::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_handles_newline_separated_text() {
        assert_eq!(
            split_command("/analyze\nSenate passes bill"),
            Some(CommandText {
                name: "analyze",
                target: None,
                rest: "Senate passes bill"
            })
        );
        assert_eq!(
            split_command("/analyze@detector_bot\n\nbody"),
            Some(CommandText {
                name: "analyze",
                target: Some("detector_bot"),
                rest: "body"
            })
        );
        assert_eq!(
            split_command("/analyze"),
            Some(CommandText {
                name: "analyze",
                target: None,
                rest: ""
            })
        );
    }

    #[test]
    fn split_command_ignores_plain_text() {
        assert_eq!(split_command("Senate passes bill"), None);
        assert_eq!(split_command(""), None);
    }

    #[test]
    fn analyze_addressed_to_another_bot_is_ignored() {
        let text = "/analyze@other_bot Senate passes bill";
        assert!(Command::parse(text, "detector_bot").is_err());
        assert_eq!(
            plain_action(text, false, Some("detector_bot")),
            PlainAction::Ignore
        );
        assert_eq!(
            plain_action(text, true, Some("detector_bot")),
            PlainAction::Ignore
        );
        assert_eq!(plain_action(text, false, None), PlainAction::Ignore);
    }

    #[test]
    fn analyze_addressed_to_this_bot_runs() {
        assert_eq!(
            plain_action(
                "/analyze@Detector_Bot\nSenate passes bill",
                false,
                Some("detector_bot")
            ),
            PlainAction::Analyze("Senate passes bill")
        );
        assert_eq!(
            plain_action("/analyze\nSenate passes bill", false, Some("detector_bot")),
            PlainAction::Analyze("Senate passes bill")
        );
    }

    #[test]
    fn plain_text_is_analyzed_only_in_private_chats() {
        assert_eq!(
            plain_action("Senate passes bill", true, Some("detector_bot")),
            PlainAction::Analyze("Senate passes bill")
        );
        assert_eq!(
            plain_action("Senate passes bill", false, Some("detector_bot")),
            PlainAction::Ignore
        );
    }

    #[test]
    fn unknown_commands_get_help_in_private_only() {
        assert_eq!(plain_action("/stats", true, None), PlainAction::Help);
        assert_eq!(plain_action("/stats", false, None), PlainAction::Ignore);
    }
}
