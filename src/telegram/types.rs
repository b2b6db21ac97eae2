use std::sync::Arc;

use teloxide::utils::command::BotCommands;

use crate::{config::AppConfig, detector::ModelContext};

pub type BotResult<T> = Result<T, teloxide::RequestError>;

/// Shared by every handler invocation; read-only after startup.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub models: ModelContext,
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "introduction and usage")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "analyze the article text that follows the command")]
    Analyze(String),
    #[command(description = "measure response latency")]
    Ping,
}
