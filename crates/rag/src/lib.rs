//! Retrieval-augmented question answering for the movie industry.
//!
//! The pipeline pulls evidence from the local knowledge store and the web,
//! assembles a bounded context, asks the model, then audits the answer
//! against its evidence and scores its trustworthiness.

pub mod context;
pub mod conversation;
pub mod evidence;
pub mod generation;
pub mod mode;
pub mod orchestrator;
pub mod retriever;
pub mod topic;
pub mod validator;
pub mod web;

#[cfg(test)]
mod tests;

pub use context::assemble;
pub use conversation::{Conversation, ConversationStore, ConversationTurn};
pub use evidence::{EvidenceItem, SourceEntry, SourceKind, SourceType};
pub use generation::{GenerationClient, GenerationResult};
pub use mode::{ResponseMode, ValidationMode};
pub use orchestrator::{ChatRequest, ChatResponse, ChatService, PipelineSettings};
pub use retriever::{EvidenceRetriever, LocalSearch};
pub use topic::{KeywordTopicGate, TopicClassifier};
pub use validator::{
    extract_citations_from_response, generate_validation_summary, ResponseValidator,
    ValidationReport,
};
pub use web::{SearchHit, WebSearchProvider, WebSearcher};
