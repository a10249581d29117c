//! Generation client: message assembly, mode policy and a response cache.

use crate::conversation::ConversationTurn;
use crate::mode::ResponseMode;
use moka::sync::Cache;
use reel_core::{AppConfig, AppError, AppResult};
use reel_llm::{create_client, ChatMessage, LlmClient, LlmRequest};
use reel_prompt::PromptLibrary;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Turbo answers always use this temperature.
pub const TURBO_TEMPERATURE: f32 = 0.3;

/// Turbo answers are capped at this many tokens.
pub const TURBO_MAX_TOKENS: u32 = 600;

/// Elapsed time reported for a cache hit, in seconds.
pub const CACHE_HIT_ELAPSED: f64 = 0.1;

const CACHE_TTL: Duration = Duration::from_secs(600);
const CACHE_CAPACITY: u64 = 1_000;

/// Heading of the context system message.
const CONTEXT_PREFIX: &str = "Additional context from knowledge base:\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    /// Present only when the provider reported usage for this call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub model_id: String,
    /// Seconds
    pub elapsed_time: f64,
    #[serde(default)]
    pub cached: bool,
}

/// Wraps the model provider with per-mode policy and caching.
pub struct GenerationClient {
    llm: Option<Arc<dyn LlmClient>>,
    unavailable_reason: String,
    prompts: PromptLibrary,
    model: String,
    turbo_model: String,
    temperature: f32,
    max_tokens: u32,
    cache: Cache<String, GenerationResult>,
}

impl GenerationClient {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: PromptLibrary,
        model: impl Into<String>,
        turbo_model: impl Into<String>,
    ) -> Self {
        Self::build(Some(llm), String::new(), prompts, model.into(), turbo_model.into())
    }

    /// A client whose every call fails with a configuration error.
    pub fn unavailable(
        reason: impl Into<String>,
        prompts: PromptLibrary,
        model: impl Into<String>,
        turbo_model: impl Into<String>,
    ) -> Self {
        Self::build(None, reason.into(), prompts, model.into(), turbo_model.into())
    }

    fn build(
        llm: Option<Arc<dyn LlmClient>>,
        unavailable_reason: String,
        prompts: PromptLibrary,
        model: String,
        turbo_model: String,
    ) -> Self {
        Self {
            llm,
            unavailable_reason,
            prompts,
            model,
            turbo_model,
            temperature: 0.7,
            max_tokens: 1000,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Defaults used when a request does not set temperature or length.
    pub fn with_defaults(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Build from configuration.
    ///
    /// A missing credential does not fail construction; it fails each
    /// generation call instead, so knowledge commands keep working.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let prompts = PromptLibrary::load(&config.workspace)?;
        let api_key = config.resolve_api_key(&config.provider);
        let endpoint = config.provider_endpoint();

        let client = match create_client(&config.provider, endpoint.as_deref(), api_key.as_deref()) {
            Ok(llm) => Self::new(llm, prompts, &config.model, &config.turbo_model),
            Err(AppError::Config(reason)) => {
                tracing::warn!("Generation disabled: {}", reason);
                Self::unavailable(reason, prompts, &config.model, &config.turbo_model)
            }
            Err(e) => return Err(e),
        };

        Ok(client.with_defaults(config.generation.temperature, config.generation.max_tokens))
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Model, temperature and token ceiling actually used for a request.
    pub fn effective_settings(
        &self,
        mode: ResponseMode,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> (&str, f32, u32) {
        match mode {
            ResponseMode::Turbo => (&self.turbo_model, TURBO_TEMPERATURE, TURBO_MAX_TOKENS),
            ResponseMode::Standard => (
                &self.model,
                temperature.unwrap_or(self.temperature),
                max_tokens.unwrap_or(self.max_tokens),
            ),
        }
    }

    /// Ordered message sequence sent to the model.
    ///
    /// In turbo mode `context` is the fixed turbo instruction and is folded
    /// into the single system message.
    pub fn build_messages(
        &self,
        history: &[ConversationTurn],
        context: Option<&str>,
        mode: ResponseMode,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);

        match mode {
            ResponseMode::Standard => {
                messages.push(ChatMessage::system(self.prompts.standard()));
                if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
                    messages.push(ChatMessage::system(format!("{}{}", CONTEXT_PREFIX, context)));
                }
            }
            ResponseMode::Turbo => {
                let system = match context.filter(|c| !c.trim().is_empty()) {
                    Some(instruction) => format!("{}\n\n{}", self.prompts.turbo(), instruction),
                    None => self.prompts.turbo().to_string(),
                };
                messages.push(ChatMessage::system(system));
            }
        }

        messages.extend(history.iter().map(ChatMessage::from));
        messages
    }

    /// Generate an answer for the conversation so far.
    ///
    /// # Errors
    /// `AppError::Config` when no provider credential is configured and
    /// `AppError::Generation` when the provider call fails.
    pub async fn generate(
        &self,
        history: &[ConversationTurn],
        context: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        mode: ResponseMode,
    ) -> AppResult<GenerationResult> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| AppError::Config(self.unavailable_reason.clone()))?;

        let (model, temperature, max_tokens) = self.effective_settings(mode, temperature, max_tokens);
        let messages = self.build_messages(history, context, mode);
        let key = cache_key(&messages, model, temperature, max_tokens, mode);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(model, "Generation cache hit");
            return Ok(GenerationResult {
                tokens_used: None,
                elapsed_time: CACHE_HIT_ELAPSED,
                cached: true,
                ..hit
            });
        }

        let request = LlmRequest::new(messages, model)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        let started = Instant::now();
        let response = llm.complete(&request).await.map_err(|e| match e {
            AppError::Generation(_) | AppError::Config(_) => e,
            other => AppError::Generation(other.to_string()),
        })?;

        let result = GenerationResult {
            text: response.content,
            tokens_used: response.usage.map(|u| u.total_tokens),
            model_id: response.model,
            elapsed_time: started.elapsed().as_secs_f64(),
            cached: false,
        };

        tracing::info!(
            model = %result.model_id,
            mode = mode.as_str(),
            tokens = ?result.tokens_used,
            elapsed = result.elapsed_time,
            "Generated response"
        );

        self.cache.insert(key, result.clone());
        Ok(result)
    }
}

fn cache_key(
    messages: &[ChatMessage],
    model: &str,
    temperature: f32,
    max_tokens: u32,
    mode: ResponseMode,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0]);
    hasher.update(mode.as_str().as_bytes());
    hasher.update(temperature.to_bits().to_le_bytes());
    hasher.update(max_tokens.to_le_bytes());
    for message in messages {
        hasher.update(message.role.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(message.content.as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}
