//! Amazon Bedrock provider implementations.
//!
//! - [`BedrockRetriever`]: knowledge-base retrieve-and-generate (agent runtime API)
//! - [`BedrockTextModel`]: direct `InvokeModel` using the Nova messages schema
//! - [`BedrockIngestion`]: data source listing and ingestion jobs (agent API)

use super::{
    Ingestion, IngestionJob, ProviderError, RetrievalResponse, RetrievedReference, Retriever,
    SourceCitation, TextModel,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseRetrieveAndGenerateConfiguration, RetrieveAndGenerateConfiguration,
    RetrieveAndGenerateInput, RetrieveAndGenerateType,
};
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};

pub struct BedrockRetriever {
    client: aws_sdk_bedrockagentruntime::Client,
}

impl BedrockRetriever {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagentruntime::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Retriever for BedrockRetriever {
    async fn retrieve_and_generate(
        &self,
        question: &str,
        knowledge_base_id: &str,
        model_arn: &str,
    ) -> Result<RetrievalResponse, ProviderError> {
        let input = RetrieveAndGenerateInput::builder()
            .text(question)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let knowledge_base = KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
            .knowledge_base_id(knowledge_base_id)
            .model_arn(model_arn)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let configuration = RetrieveAndGenerateConfiguration::builder()
            .r#type(RetrieveAndGenerateType::KnowledgeBase)
            .knowledge_base_configuration(knowledge_base)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            knowledge_base_id = %knowledge_base_id,
            question_len = question.len(),
            "Sending retrieve-and-generate request"
        );

        let output = self
            .client
            .retrieve_and_generate()
            .input(input)
            .retrieve_and_generate_configuration(configuration)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ApiError(
                    aws_sdk_bedrockagentruntime::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        let answer = output
            .output()
            .map(|generated| generated.text().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("missing generated output".into()))?;

        let citations = output.citations().iter().map(source_citation).collect();

        Ok(RetrievalResponse { answer, citations })
    }
}

/// Flattens an SDK citation into owned references; a reference without
/// retrieved content keeps an empty text.
fn source_citation(citation: &aws_sdk_bedrockagentruntime::types::Citation) -> SourceCitation {
    SourceCitation {
        references: citation
            .retrieved_references()
            .iter()
            .map(|reference| RetrievedReference {
                text: reference
                    .content()
                    .map(|content| content.text())
                    .unwrap_or_default()
                    .to_string(),
                uri: reference
                    .location()
                    .and_then(|location| location.s3_location())
                    .and_then(|s3| s3.uri())
                    .map(str::to_string),
            })
            .collect(),
    }
}

pub struct BedrockTextModel {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockTextModel {
    pub fn new(sdk_config: &SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(sdk_config),
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl TextModel for BedrockTextModel {
    async fn complete(&self, prompt: &str, max_tokens: i32) -> Result<String, ProviderError> {
        let payload = serde_json::to_vec(&CompletionRequest::single_turn(prompt, max_tokens))
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            "Sending InvokeModel request"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                ProviderError::ApiError(
                    aws_sdk_bedrockruntime::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        parse_completion(output.body().as_ref())
    }
}

/// Extracts the first text block of a messages-API completion.
pub fn parse_completion(body: &[u8]) -> Result<String, ProviderError> {
    let response: CompletionResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .output
        .message
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| ProviderError::InvalidResponse("completion has no text content".into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    messages: Vec<Message>,
    inference_config: InferenceConfig,
}

impl CompletionRequest {
    fn single_turn(prompt: &str, max_tokens: i32) -> Self {
        Self {
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock {
                    text: Some(prompt.to_string()),
                }],
            }],
            inference_config: InferenceConfig { max_tokens },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: i32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    output: CompletionOutput,
}

#[derive(Debug, Deserialize)]
struct CompletionOutput {
    message: Message,
}

pub struct BedrockIngestion {
    client: aws_sdk_bedrockagent::Client,
}

impl BedrockIngestion {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagent::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Ingestion for BedrockIngestion {
    async fn list_data_sources(
        &self,
        knowledge_base_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let output = self
            .client
            .list_data_sources()
            .knowledge_base_id(knowledge_base_id)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ApiError(
                    aws_sdk_bedrockagent::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(output
            .data_source_summaries()
            .iter()
            .map(|summary| summary.data_source_id().to_string())
            .collect())
    }

    async fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, ProviderError> {
        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ApiError(
                    aws_sdk_bedrockagent::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        let job = output
            .ingestion_job()
            .ok_or_else(|| ProviderError::InvalidResponse("missing ingestion job".into()))?;

        Ok(IngestionJob {
            job_id: job.ingestion_job_id().to_string(),
            status: job.status().as_str().to_string(),
        })
    }
}
