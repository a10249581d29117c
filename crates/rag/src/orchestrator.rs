//! Conversation orchestrator.
//!
//! One call to [`ChatService::submit_question`] runs the whole pipeline:
//! topic gate, retrieval, context assembly, generation, validation and the
//! validation-driven rewrite of the answer text. Both turns are appended to
//! the conversation under its lock.

use crate::context::assemble;
use crate::conversation::{Conversation, ConversationStore, ConversationTurn};
use crate::evidence::{EvidenceItem, SourceEntry};
use crate::generation::GenerationClient;
use crate::mode::{ResponseMode, ValidationMode};
use crate::retriever::{EvidenceRetriever, LocalSearch};
use crate::topic::{passes_gate, KeywordTopicGate, TopicClassifier, REDIRECT_MESSAGE};
use crate::validator::{augment_response, ResponseValidator, ValidationReport};
use crate::web::WebSearcher;
use chrono::{DateTime, Utc};
use reel_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest accepted question, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// A question submitted to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_sources: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_true")]
    pub fast_validation: bool,
    #[serde(default)]
    pub turbo_mode: bool,
    #[serde(default = "default_true")]
    pub use_web: bool,
}

fn default_true() -> bool {
    true
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            include_sources: true,
            temperature: None,
            max_tokens: None,
            fast_validation: true,
            turbo_mode: false,
            use_web: true,
        }
    }

    pub fn with_conversation(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_turbo(mut self, turbo: bool) -> Self {
        self.turbo_mode = turbo;
        self
    }

    pub fn with_fast_validation(mut self, fast: bool) -> Self {
        self.fast_validation = fast;
        self
    }

    pub fn with_sources(mut self, include: bool) -> Self {
        self.include_sources = include;
        self
    }

    pub fn with_web(mut self, use_web: bool) -> Self {
        self.use_web = use_web;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The answer to a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    /// Seconds
    pub response_time: f64,
    /// Seconds spent in generation; a fixed small value on a cache hit
    #[serde(default)]
    pub generation_time: f64,
    /// The answer came from the generation cache
    #[serde(default)]
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub mode: ResponseMode,
    pub timestamp: DateTime<Utc>,
}

/// Retrieval and history limits for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub local_limit: usize,
    pub web_limit: usize,
    pub web_enabled: bool,
    pub max_history: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            local_limit: 3,
            web_limit: 2,
            web_enabled: true,
            max_history: 10,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            local_limit: config.retrieval.local_limit,
            web_limit: config.retrieval.web_limit,
            web_enabled: config.retrieval.web_enabled,
            max_history: config.generation.max_conversation_history.max(1),
        }
    }
}

pub struct ChatService {
    retriever: EvidenceRetriever,
    generator: GenerationClient,
    validator: ResponseValidator,
    topic_gate: Arc<dyn TopicClassifier>,
    conversations: ConversationStore,
    settings: PipelineSettings,
}

impl ChatService {
    pub fn new(retriever: EvidenceRetriever, generator: GenerationClient) -> Self {
        Self {
            retriever,
            generator,
            validator: ResponseValidator::default(),
            topic_gate: Arc::new(KeywordTopicGate),
            conversations: ConversationStore::new(),
            settings: PipelineSettings::default(),
        }
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_topic_gate(mut self, gate: Arc<dyn TopicClassifier>) -> Self {
        self.topic_gate = gate;
        self
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Wire the full pipeline from configuration.
    pub fn from_config(config: &AppConfig, local: Option<Arc<dyn LocalSearch>>) -> AppResult<Self> {
        let mut retriever = EvidenceRetriever::new();
        if let Some(local) = local {
            retriever = retriever.with_local(local);
        }
        if config.retrieval.web_enabled {
            let web = WebSearcher::duckduckgo(
                Duration::from_secs(config.retrieval.request_timeout_secs),
                config.retrieval.page_char_limit,
            )?
            .with_fetch_delay(Duration::from_millis(config.retrieval.fetch_delay_ms));
            retriever = retriever.with_web(web);
        }

        let generator = GenerationClient::from_config(config)?;

        Ok(Self::new(retriever, generator).with_settings(PipelineSettings::from_config(config)))
    }

    /// Whether a model provider is configured. Without one every question
    /// fails with a configuration error.
    pub fn can_generate(&self) -> bool {
        self.generator.is_available()
    }

    /// Answer a question within a conversation.
    ///
    /// # Errors
    /// Rejects empty or oversized messages. Configuration and generation
    /// failures are returned as-is; retrieval and validation never fail.
    pub async fn submit_question(&self, request: ChatRequest) -> AppResult<ChatResponse> {
        let started = Instant::now();
        let message = request.message.trim();

        if message.is_empty() {
            return Err(AppError::Other("Message must not be empty".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Other(format!(
                "Message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let (conversation_id, handle) = self
            .conversations
            .get_or_create(request.conversation_id.as_deref());
        let mut conversation = handle.lock().await;
        conversation.push(ConversationTurn::user(message));

        let mode = ResponseMode::from_turbo_flag(request.turbo_mode);

        if !passes_gate(self.topic_gate.as_ref(), message) {
            tracing::info!(conversation = %conversation_id, "Question rejected by topic gate");
            conversation.push(ConversationTurn::assistant(REDIRECT_MESSAGE));
            return Ok(ChatResponse {
                response: REDIRECT_MESSAGE.to_string(),
                conversation_id,
                sources: None,
                tokens_used: None,
                response_time: started.elapsed().as_secs_f64(),
                generation_time: 0.0,
                cached: false,
                validation: None,
                model_id: None,
                mode,
                timestamp: Utc::now(),
            });
        }

        let evidence: Vec<EvidenceItem> = match mode {
            ResponseMode::Turbo => Vec::new(),
            ResponseMode::Standard => {
                let skip_web = !(request.use_web && self.settings.web_enabled);
                self.retriever
                    .retrieve(
                        message,
                        self.settings.local_limit,
                        self.settings.web_limit,
                        skip_web,
                    )
                    .await
            }
        };

        let context = assemble(&evidence, mode);
        let generation = self
            .generator
            .generate(
                conversation.recent(self.settings.max_history),
                Some(&context),
                request.temperature,
                request.max_tokens,
                mode,
            )
            .await?;

        let (validation, response) = match mode {
            ResponseMode::Turbo => (ValidationReport::turbo_stub(), generation.text.clone()),
            ResponseMode::Standard => {
                let validation = self.validator.validate(
                    &generation.text,
                    &evidence,
                    message,
                    ValidationMode::from_fast_flag(request.fast_validation),
                );
                let response = augment_response(&generation.text, &validation);
                (validation, response)
            }
        };

        conversation.push(ConversationTurn::assistant(response.clone()));
        drop(conversation);

        let sources = request.include_sources.then(|| match mode {
            ResponseMode::Turbo => self.validator.extract_citations_from_response(&generation.text),
            ResponseMode::Standard => evidence.iter().map(SourceEntry::from).collect(),
        });

        let response_time = started.elapsed().as_secs_f64();
        tracing::info!(
            conversation = %conversation_id,
            mode = mode.as_str(),
            evidence = evidence.len(),
            confidence = validation.confidence_score,
            cached = generation.cached,
            response_time,
            "Answered question"
        );

        Ok(ChatResponse {
            response,
            conversation_id,
            sources,
            tokens_used: generation.tokens_used,
            response_time,
            generation_time: generation.elapsed_time,
            cached: generation.cached,
            validation: Some(validation),
            model_id: Some(generation.model_id),
            mode,
            timestamp: Utc::now(),
        })
    }

    pub async fn conversation(&self, id: &str) -> Option<Conversation> {
        self.conversations.get(id).await
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.conversations.list().await
    }

    pub async fn clear_conversation(&self, id: &str) -> bool {
        self.conversations.clear(id).await
    }

    pub fn delete_conversation(&self, id: &str) -> bool {
        self.conversations.delete(id)
    }
}
