//! Remote chat-completion client used as an upgrade over the rule engine.
//!
//! Failures come back as an [`AssistantError`] so the caller can decide
//! between showing an error and falling back to a templated reply.

use crate::models::{Habit, MetricsSnapshot, Profile};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant is not configured")]
    NotConfigured,
    #[error("invalid API key")]
    Unauthorized,
    #[error("API access forbidden")]
    Forbidden,
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("network error: {0}")]
    NetworkUnreachable(String),
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AssistantError {
    /// Stable name reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AssistantError::NotConfigured => "not-configured",
            AssistantError::Unauthorized => "unauthorized",
            AssistantError::Forbidden => "forbidden",
            AssistantError::RateLimited { .. } => "rate-limited",
            AssistantError::NetworkUnreachable(_) => "network-unreachable",
            AssistantError::UnexpectedStatus(_) => "unexpected-status",
            AssistantError::MalformedResponse(_) => "malformed-response",
        }
    }
}

#[derive(Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [CompletionMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct Assistant {
    config: AssistantConfig,
    client: Client,
}

impl Assistant {
    pub fn new(config: AssistantConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("habitra/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn respond(
        &self,
        message: &str,
        profile: &Profile,
        habits: &[Habit],
        metrics: &MetricsSnapshot,
    ) -> Result<String, AssistantError> {
        let prompt = system_prompt(profile, habits, metrics);
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                CompletionMessage {
                    role: "system",
                    content: &prompt,
                },
                CompletionMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(%url, model = %self.config.model, "requesting completion");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| AssistantError::NetworkUnreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error = match status {
                StatusCode::UNAUTHORIZED => AssistantError::Unauthorized,
                StatusCode::FORBIDDEN => AssistantError::Forbidden,
                StatusCode::TOO_MANY_REQUESTS => AssistantError::RateLimited {
                    retry_after_secs: response
                        .headers()
                        .get(header::RETRY_AFTER)
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| value.trim().parse().ok()),
                },
                other => AssistantError::UnexpectedStatus(other.as_u16()),
            };
            warn!(status = status.as_u16(), "completion request failed: {error}");
            return Err(error);
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|err| AssistantError::MalformedResponse(err.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AssistantError::MalformedResponse("no message in choices".to_string()))
    }
}

pub fn system_prompt(profile: &Profile, habits: &[Habit], metrics: &MetricsSnapshot) -> String {
    let habit_lines: Vec<String> = habits
        .iter()
        .map(|h| {
            let status = if h.completed { "Completed" } else { "Not completed" };
            format!("- {}: {} ({} day streak)", h.name, status, h.streak)
        })
        .collect();

    format!(
        "You are a personal habit analyst for {name}.\n\n\
         USER DATA:\n\
         - Name: {name}\n\
         - Active Time: {active}\n\
         - Daily Availability: {availability}\n\
         - Habit Intensity: {intensity}\n\
         - Stress Sensitivity: {sensitivity}\n\n\
         CURRENT METRICS:\n\
         - Consistency: {consistency}%\n\
         - Current Streak: {streak} days\n\
         - Discipline Score: {discipline}/10\n\
         - Stress Level: {stress}\n\n\
         TODAY'S HABITS:\n\
         {habits}\n\n\
         RULES:\n\
         - Only analyze THIS USER'S data\n\
         - Be specific about their patterns\n\
         - Reference their actual metrics\n\
         - No generic advice\n\
         - Professional, analytical tone\n\
         - No emojis or motivational quotes\n\
         - Focus on data-driven insights",
        name = profile.full_name,
        active = profile.active_time,
        availability = profile.daily_availability,
        intensity = profile.habit_intensity,
        sensitivity = profile.stress_sensitivity,
        consistency = metrics.consistency,
        streak = metrics.streak,
        discipline = metrics.discipline,
        stress = metrics.stress,
        habits = habit_lines.join("\n"),
    )
}
