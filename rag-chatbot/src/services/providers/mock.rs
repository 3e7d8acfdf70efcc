//! Mock provider implementations for testing.

use super::{
    Ingestion, IngestionJob, ProviderError, RetrievalResponse, Retriever, TextModel,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock retriever returning a canned response or failing every call.
pub struct MockRetriever {
    response: Result<RetrievalResponse, String>,
    calls: AtomicUsize,
}

impl MockRetriever {
    pub fn answering(response: RetrievalResponse) -> Self {
        Self {
            response: Ok(response),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve_and_generate(
        &self,
        _question: &str,
        _knowledge_base_id: &str,
        _model_arn: &str,
    ) -> Result<RetrievalResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(ProviderError::ApiError)
    }
}

/// Mock model that echoes the prompt, or fails every call.
pub struct MockTextModel {
    enabled: bool,
    requests: Mutex<Vec<(String, i32)>>,
}

impl MockTextModel {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Prompts and token bounds received so far.
    pub fn requests(&self) -> Vec<(String, i32)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextModel for MockTextModel {
    async fn complete(&self, prompt: &str, max_tokens: i32) -> Result<String, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((prompt.to_string(), max_tokens));
        }

        if !self.enabled {
            return Err(ProviderError::ApiError(
                "Mock text model not enabled".to_string(),
            ));
        }

        Ok(format!("Mock response for: {}", prompt))
    }
}

/// Mock ingestion service with a fixed set of data sources.
pub struct MockIngestion {
    data_sources: Vec<String>,
    started: Mutex<Vec<(String, String)>>,
}

impl MockIngestion {
    pub fn new(data_sources: Vec<String>) -> Self {
        Self {
            data_sources,
            started: Mutex::new(Vec::new()),
        }
    }

    /// `(knowledge_base_id, data_source_id)` pairs of started jobs.
    pub fn started_jobs(&self) -> Vec<(String, String)> {
        self.started
            .lock()
            .map(|started| started.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Ingestion for MockIngestion {
    async fn list_data_sources(
        &self,
        _knowledge_base_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(self.data_sources.clone())
    }

    async fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, ProviderError> {
        let mut started = self
            .started
            .lock()
            .map_err(|_| ProviderError::ApiError("lock poisoned".to_string()))?;
        started.push((knowledge_base_id.to_string(), data_source_id.to_string()));

        Ok(IngestionJob {
            job_id: format!("job-{}", started.len()),
            status: "STARTING".to_string(),
        })
    }
}
