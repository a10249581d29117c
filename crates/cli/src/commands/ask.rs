//! Ask command handler.
//!
//! Runs one question through the full answering pipeline.

use super::{build_service, print_json, print_sources};
use clap::Args;
use reel_core::{config::AppConfig, AppError, AppResult};
use reel_rag::ChatRequest;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Continue an existing conversation
    #[arg(long)]
    pub conversation: Option<String>,

    /// Fast answer: no retrieval, no validation, cheaper model
    #[arg(long)]
    pub turbo: bool,

    /// Cross-check citations and flag numeric claims
    #[arg(long)]
    pub full_validation: bool,

    /// Do not search the web
    #[arg(long)]
    pub no_web: bool,

    /// Do not list sources
    #[arg(long)]
    pub no_sources: bool,

    /// Temperature for response generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub fn to_request(&self) -> AppResult<ChatRequest> {
        let question = self.question.join(" ");
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let mut request = ChatRequest::new(question)
            .with_turbo(self.turbo)
            .with_fast_validation(!self.full_validation)
            .with_web(!self.no_web)
            .with_sources(!self.no_sources);

        if let Some(id) = &self.conversation {
            request = request.with_conversation(id.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        Ok(request)
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let request = self.to_request()?;
        let service = build_service(config)?;
        let response = service.submit_question(request).await?;

        if self.json {
            return print_json(&response);
        }

        println!("{}", response.response);
        if let Some(ref sources) = response.sources {
            print_sources(sources);
        }

        if let Some(ref validation) = response.validation {
            tracing::debug!(
                "Confidence {:.1}%, {} warnings, validated: {}",
                validation.confidence_score * 100.0,
                validation.warnings.len(),
                validation.validated
            );
        }
        if let Some(tokens) = response.tokens_used {
            tracing::debug!("Tokens used: {}", tokens);
        }
        tracing::debug!(
            "Response time: {:.2}s (generation {:.2}s, cached: {})",
            response.response_time,
            response.generation_time,
            response.cached
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        ask: AskCommand,
    }

    #[test]
    fn test_flags_map_to_request() {
        let cli = TestCli::parse_from([
            "reel",
            "how",
            "long",
            "is",
            "a",
            "shoot?",
            "--turbo",
            "--full-validation",
            "--no-web",
            "--temperature",
            "0.2",
        ]);
        let request = cli.ask.to_request().unwrap();

        assert_eq!(request.message, "how long is a shoot?");
        assert!(request.turbo_mode);
        assert!(!request.fast_validation);
        assert!(!request.use_web);
        assert!(request.include_sources);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, None);
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["reel", "What is a gaffer?"]);
        let request = cli.ask.to_request().unwrap();
        assert!(request.fast_validation);
        assert!(!request.turbo_mode);
        assert!(request.use_web);
        assert!(request.conversation_id.is_none());
    }
}
