use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cardline_core::config::{LlmConfig, LlmProvider};
use cardline_core::errors::ApplicationError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const MISSING_API_KEY_MESSAGE: &str = "OpenAI API key not configured on server";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<CompletionMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// A bare user prompt with no system instruction.
    pub fn prompt_only(model: impl Into<String>, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self::single_turn(model, String::new(), prompt, max_tokens)
    }

    /// One system instruction followed by a single user message.
    pub fn single_turn(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system: system.into(),
            messages: vec![CompletionMessage::user(user)],
            model: model.into(),
            temperature: 0.7,
            max_tokens,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("{0}")]
    Configuration(String),
    #[error("completion transport failed: {0}")]
    Transport(String),
    #[error("completion service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("completion response was not understood: {0}")]
    InvalidResponse(String),
    #[error("completion service timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl From<CompletionError> for ApplicationError {
    fn from(value: CompletionError) -> Self {
        match value {
            CompletionError::Configuration(message) => Self::Configuration(message),
            CompletionError::Timeout { secs } => Self::Timeout { secs },
            other => Self::Service(other.to_string()),
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;

    /// Whether requests can reach a provider at all.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Builds the client described by config: the provider client, or the
/// unconfigured stand-in when an OpenAI key is missing, wrapped in the deadline.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    if config.provider == LlmProvider::OpenAi && !config.has_credentials() {
        return Ok(Arc::new(UnconfiguredCompletionClient));
    }

    let client = OpenAiCompletionClient::new(config.effective_base_url(), config.api_key.clone())?;
    Ok(Arc::new(TimeoutCompletionClient::new(client, timeout)))
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<&'a CompletionMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ChatChoice>,
    model: String,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenAI and OpenAI-compatible endpoints (Ollama).
#[derive(Clone, Debug)]
pub struct OpenAiCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompletionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| CompletionError::Configuration(error.to_string()))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), api_key })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let system = CompletionMessage::system(request.system.clone());
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(&system);
        }
        messages.extend(request.messages.iter());

        let body = ChatCompletionBody {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            event_name = "llm.completion.request",
            model = %request.model,
            max_tokens = request.max_tokens,
            "sending chat completion request"
        );

        let mut builder = self.http.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| CompletionError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream { status: status.as_u16(), body });
        }

        let reply: ChatCompletionReply = response
            .json()
            .await
            .map_err(|error| CompletionError::InvalidResponse(error.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::InvalidResponse("no choices returned".to_string()))?;

        Ok(CompletionResponse { content, model: reply.model, usage: reply.usage })
    }
}

/// Stand-in used when no credential is configured; lookups keep working
/// while every completion fails with a configuration error.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredCompletionClient;

#[async_trait]
impl CompletionClient for UnconfiguredCompletionClient {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        Err(CompletionError::Configuration(MISSING_API_KEY_MESSAGE.to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct TimeoutCompletionClient<C> {
    inner: C,
    timeout: Duration,
}

impl<C> TimeoutCompletionClient<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<C> CompletionClient for TimeoutCompletionClient<C>
where
    C: CompletionClient,
{
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout { secs: self.timeout.as_secs() }),
        }
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }
}

/// Deterministic client that replays queued outcomes and records every request.
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletionClient {
    pub fn new(script: Vec<Result<String, CompletionError>>) -> Self {
        Self { script: Mutex::new(script.into()), ..Self::default() }
    }

    /// Answers every request with the same text.
    pub fn constant(content: impl Into<String>) -> Self {
        Self { fallback: Some(content.into()), ..Self::default() }
    }

    pub fn failing(error: CompletionError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let model = request.model.clone();
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).pop_front();
        let content = match (next, &self.fallback) {
            (Some(outcome), _) => outcome?,
            (None, Some(fallback)) => fallback.clone(),
            (None, None) => {
                return Err(CompletionError::InvalidResponse("script exhausted".to_string()))
            }
        };

        let completion_tokens = content.split_whitespace().count() as u32;
        Ok(CompletionResponse {
            content,
            model,
            usage: Some(TokenUsage {
                prompt_tokens: 0,
                completion_tokens,
                total_tokens: completion_tokens,
            }),
        })
    }
}

#[async_trait]
impl<T> CompletionClient for Arc<T>
where
    T: CompletionClient + ?Sized,
{
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        (**self).complete(request).await
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
