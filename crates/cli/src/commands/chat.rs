//! Chat command handler.
//!
//! Interactive loop over a single conversation.

use super::{build_service, print_sources};
use clap::Args;
use reel_core::{config::AppConfig, failure_message, AppResult};
use reel_rag::{ChatRequest, ChatService};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Interactive conversation
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Resume an existing conversation id
    #[arg(long)]
    pub conversation: Option<String>,

    /// Fast answers: no retrieval, no validation, cheaper model
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
}

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Quit,
    Clear,
    History,
    Help,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Empty,
        "/quit" | "/exit" => ChatInput::Quit,
        "/clear" => ChatInput::Clear,
        "/history" => ChatInput::History,
        "/help" => ChatInput::Help,
        question => ChatInput::Question(question),
    }
}

const HELP: &str = "Commands: /history, /clear, /help, /quit";

impl ChatCommand {
    fn request(&self, question: &str, conversation_id: Option<&str>) -> ChatRequest {
        let request = ChatRequest::new(question)
            .with_turbo(self.turbo)
            .with_fast_validation(!self.full_validation)
            .with_web(!self.no_web)
            .with_sources(!self.no_sources);
        match conversation_id {
            Some(id) => request.with_conversation(id),
            None => request,
        }
    }

    async fn show_history(service: &ChatService, conversation_id: Option<&str>) {
        let conversation = match conversation_id {
            Some(id) => service.conversation(id).await,
            None => None,
        };
        match conversation {
            Some(conversation) if !conversation.turns.is_empty() => {
                for turn in &conversation.turns {
                    println!(
                        "[{}] {}: {}",
                        turn.timestamp.format("%H:%M:%S"),
                        turn.role.as_str(),
                        turn.content
                    );
                }
            }
            _ => println!("(no history)"),
        }
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let service = build_service(config)?;
        let mut conversation_id = self.conversation.clone();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("reel chat. {}", HELP);

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::Help => println!("{}", HELP),
                ChatInput::History => Self::show_history(&service, conversation_id.as_deref()).await,
                ChatInput::Clear => {
                    if let Some(id) = conversation_id.as_deref() {
                        service.clear_conversation(id).await;
                    }
                    println!("Conversation cleared");
                }
                ChatInput::Question(question) => {
                    let request = self.request(question, conversation_id.as_deref());
                    match service.submit_question(request).await {
                        Ok(response) => {
                            conversation_id = Some(response.conversation_id.clone());
                            println!("\n{}", response.response);
                            if let Some(ref sources) = response.sources {
                                print_sources(sources);
                            }
                            println!();
                        }
                        Err(e) => {
                            tracing::error!("Chat request failed: {}", e);
                            eprintln!("{}", failure_message(&e, config.debug));
                        }
                    }
                }
            }
        }

        if let Some(id) = conversation_id {
            tracing::debug!("Chat ended for conversation {}", id);
        }

        Ok(())
    }
}
