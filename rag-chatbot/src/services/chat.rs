//! Chat resolution: knowledge-base answer first, direct model completion
//! when retrieval fails.

use crate::models::{ChatResult, Citation};
use crate::services::providers::{ProviderError, RetrievalResponse, Retriever, TextModel};
use std::sync::Arc;

pub const MAX_CITATIONS: usize = 3;
pub const CITATION_TEXT_LIMIT: usize = 200;
pub const DIRECT_MODEL_MAX_TOKENS: i32 = 1024;

/// Result of the knowledge-base attempt.
#[derive(Debug)]
pub enum RetrievalOutcome {
    Cited {
        answer: String,
        citations: Vec<Citation>,
    },
    Uncited {
        answer: String,
    },
    Failed(ProviderError),
}

#[derive(Clone)]
pub struct ChatService {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn TextModel>,
    knowledge_base_id: Option<String>,
    model_arn: String,
}

impl ChatService {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn TextModel>,
        knowledge_base_id: Option<String>,
        model_arn: String,
    ) -> Self {
        Self {
            retriever,
            model,
            knowledge_base_id,
            model_arn,
        }
    }

    /// Answers `question`, falling back to the bare model on any retrieval
    /// failure. A fallback failure is returned to the caller as is.
    pub async fn answer(&self, question: &str) -> Result<ChatResult, ProviderError> {
        match self.retrieve(question).await {
            RetrievalOutcome::Cited { answer, citations } => {
                Ok(ChatResult::from_knowledge_base(answer, citations))
            }
            RetrievalOutcome::Uncited { answer } => {
                Ok(ChatResult::from_knowledge_base(answer, Vec::new()))
            }
            RetrievalOutcome::Failed(err) => {
                tracing::warn!(
                    error = %err,
                    "Knowledge base retrieval failed, answering with direct model"
                );
                self.answer_directly(question).await
            }
        }
    }

    pub async fn retrieve(&self, question: &str) -> RetrievalOutcome {
        let Some(knowledge_base_id) = self.knowledge_base_id.as_deref() else {
            return RetrievalOutcome::Failed(ProviderError::NotConfigured(
                "KNOWLEDGE_BASE_ID".to_string(),
            ));
        };

        match self
            .retriever
            .retrieve_and_generate(question, knowledge_base_id, &self.model_arn)
            .await
        {
            Ok(response) => {
                let citations = collect_citations(&response);
                if citations.is_empty() {
                    RetrievalOutcome::Uncited {
                        answer: response.answer,
                    }
                } else {
                    RetrievalOutcome::Cited {
                        answer: response.answer,
                        citations,
                    }
                }
            }
            Err(err) => RetrievalOutcome::Failed(err),
        }
    }

    async fn answer_directly(&self, question: &str) -> Result<ChatResult, ProviderError> {
        let answer = self
            .model
            .complete(question, DIRECT_MODEL_MAX_TOKENS)
            .await?;
        Ok(ChatResult::from_direct_model(answer))
    }
}

/// Flattens every reference of every citation, in service order, keeping
/// the first [`MAX_CITATIONS`].
pub fn collect_citations(response: &RetrievalResponse) -> Vec<Citation> {
    response
        .citations
        .iter()
        .flat_map(|citation| citation.references.iter())
        .take(MAX_CITATIONS)
        .map(|reference| Citation {
            text: truncate_chars(&reference.text, CITATION_TEXT_LIMIT),
            source: reference.uri.clone().unwrap_or_default(),
        })
        .collect()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
