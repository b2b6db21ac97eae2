use std::{env, path::PathBuf, time::Duration};

use chrono_tz::Tz;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, LoggingConfig, ModelConfig, PresentationConfig,
};

const DEFAULT_VECTORIZER_PATH: &str = "models/tfidf_vectorizer.json";
const DEFAULT_CLASSIFIER_PATH: &str = "models/pac_model.json";
const DEFAULT_RESULT_DELAY_MS: u64 = 1_000;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let bot_username = env::var("BOT_USERNAME").ok().filter(|v| !v.is_empty());

        let models = ModelConfig {
            vectorizer_path: path_or("VECTORIZER_PATH", DEFAULT_VECTORIZER_PATH),
            classifier_path: path_or("CLASSIFIER_PATH", DEFAULT_CLASSIFIER_PATH),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let timezone = parse_timezone(env::var("APP_TIMEZONE").ok().as_deref())?;

        let presentation = PresentationConfig {
            result_delay: parse_delay_ms(env::var("RESULT_DELAY_MS").ok().as_deref())?,
        };

        Ok(Self {
            telegram_bot_token,
            bot_username,
            models,
            directories,
            logging,
            timezone,
            presentation,
        })
    }
}

fn path_or(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn parse_timezone(raw: Option<&str>) -> Result<Tz, ConfigError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(chrono_tz::UTC),
        Some(value) => value.parse::<Tz>().map_err(|_| ConfigError::Invalid {
            key: "APP_TIMEZONE",
            value: value.to_string(),
        }),
    }
}

fn parse_delay_ms(raw: Option<&str>) -> Result<Duration, ConfigError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Duration::from_millis(DEFAULT_RESULT_DELAY_MS)),
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid {
                key: "RESULT_DELAY_MS",
                value: value.to_string(),
            }),
    }
}
