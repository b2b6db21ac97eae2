use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use teloxide::Bot;
use tokio::time::timeout;

use crate::{
    config::AppConfig,
    detector::ModelContext,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    telegram::TelegramService,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DetectorApp {
    telegram: TelegramService,
    shutdown: Shutdown,
}

impl DetectorApp {
    /// Loads the model pair before anything user-facing exists; a load failure
    /// ends startup here.
    pub fn initialize(config: AppConfig, paths: &ResolvedPaths, shutdown: Shutdown) -> Result<Self> {
        let models = ModelContext::load(&paths.models).context("failed to load model artifacts")?;

        let http_client = Client::builder()
            .user_agent(format!("fake-news-detector/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let bot = Bot::with_client(config.telegram_bot_token.clone(), http_client);

        let telegram = TelegramService::new(bot, Arc::new(config), models);
        Ok(Self { telegram, shutdown })
    }

    pub async fn run(self) -> Result<()> {
        let DetectorApp { telegram, shutdown } = self;

        tracing::info!("fake news detector started");

        let mut shutdown_listener = shutdown.subscribe();
        let mut telegram_future = Box::pin(telegram.run(shutdown.subscribe()));
        let mut telegram_completed = false;

        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!("shutdown requested");
            }
            res = &mut telegram_future => {
                telegram_completed = true;
                if let Err(err) = res {
                    tracing::error!(?err, "Telegram dispatcher stopped with an error");
                    return Err(err);
                }
                tracing::info!("Telegram dispatcher stopped");
            }
        }

        shutdown.trigger();

        if !telegram_completed {
            match timeout(SHUTDOWN_TIMEOUT, &mut telegram_future).await {
                Ok(Err(err)) => {
                    tracing::error!(?err, "Telegram dispatcher stopped with an error");
                }
                Ok(Ok(())) => {}
                Err(_) => {
                    tracing::warn!(
                        target: "telegram",
                        "Telegram dispatcher did not stop within {:?}; forcing exit",
                        SHUTDOWN_TIMEOUT
                    );
                }
            }
        }

        tracing::info!("fake news detector stopped");
        Ok(())
    }
}
