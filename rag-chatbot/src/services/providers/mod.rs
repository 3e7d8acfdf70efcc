//! Knowledge-base, model and ingestion provider abstractions.
//!
//! Each external Bedrock capability sits behind a trait so handlers can be
//! exercised against the mocks in [`mock`].

pub mod bedrock;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// A passage the retrieval service used when generating an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievedReference {
    pub text: String,
    pub uri: Option<String>,
}

/// One citation span of a generated answer and the references behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCitation {
    pub references: Vec<RetrievedReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResponse {
    pub answer: String,
    pub citations: Vec<SourceCitation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionJob {
    pub job_id: String,
    pub status: String,
}

/// Retrieval-augmented generation against a knowledge base.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve_and_generate(
        &self,
        question: &str,
        knowledge_base_id: &str,
        model_arn: &str,
    ) -> Result<RetrievalResponse, ProviderError>;
}

/// Plain single-turn model completion.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: i32) -> Result<String, ProviderError>;
}

/// Knowledge-base ingestion control.
#[async_trait]
pub trait Ingestion: Send + Sync {
    /// Data source ids registered under the knowledge base, in service order.
    async fn list_data_sources(&self, knowledge_base_id: &str)
        -> Result<Vec<String>, ProviderError>;

    async fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, ProviderError>;
}
