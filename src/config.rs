use crate::assistant::AssistantConfig;
use crate::storage::resolve_data_path;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Present only when `OPENAI_API_KEY` is set.
    pub assistant: Option<AssistantConfig>,
    pub reply_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let assistant = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                let mut config = AssistantConfig::new(key.trim());
                if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
                    config.base_url = base_url;
                }
                if let Ok(model) = env::var("OPENAI_MODEL") {
                    config.model = model;
                }
                if let Some(secs) = parse_var::<u64>("ASSISTANT_TIMEOUT_SECS") {
                    config.timeout = Duration::from_secs(secs);
                }
                config
            });

        Self {
            port: parse_var("PORT").unwrap_or(8080),
            data_path: resolve_data_path(),
            assistant,
            reply_delay: Duration::from_millis(parse_var("CHAT_REPLY_DELAY_MS").unwrap_or(0)),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}
