#![allow(dead_code)]

use rag_chatbot::config::{
    ChatbotConfig, KnowledgeBaseConfig, ModelConfig, StorageBackend, StorageConfig,
    DEFAULT_MODEL_ID,
};
use rag_chatbot::services::providers::mock::{MockIngestion, MockRetriever, MockTextModel};
use rag_chatbot::services::providers::{RetrievalResponse, RetrievedReference, SourceCitation};
use rag_chatbot::services::{ChatService, LocalStorage};
use rag_chatbot::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_KNOWLEDGE_BASE_ID: &str = "KB-TEST-123";
pub const TEST_DATA_SOURCE_ID: &str = "DS-TEST-1";

/// Collaborators injected into a test application.
pub struct TestProviders {
    pub knowledge_base_id: Option<String>,
    pub retriever: Arc<MockRetriever>,
    pub model: Arc<MockTextModel>,
    pub ingestion: Arc<MockIngestion>,
}

impl Default for TestProviders {
    fn default() -> Self {
        Self {
            knowledge_base_id: Some(TEST_KNOWLEDGE_BASE_ID.to_string()),
            retriever: Arc::new(MockRetriever::answering(sample_retrieval())),
            model: Arc::new(MockTextModel::new(true)),
            ingestion: Arc::new(MockIngestion::new(vec![TEST_DATA_SOURCE_ID.to_string()])),
        }
    }
}

/// Knowledge-base answer with two citations holding five references.
pub fn sample_retrieval() -> RetrievalResponse {
    let reference = |text: String, uri: Option<&str>| RetrievedReference {
        text,
        uri: uri.map(str::to_string),
    };

    RetrievalResponse {
        answer: "Refunds are processed within 5 days.".to_string(),
        citations: vec![
            SourceCitation {
                references: vec![
                    reference("x".repeat(500), Some("s3://docs-bucket/policy.pdf")),
                    reference("Refund window".to_string(), None),
                ],
            },
            SourceCitation {
                references: vec![
                    reference("Processing times".to_string(), Some("s3://docs-bucket/faq.md")),
                    reference("Fourth".to_string(), Some("s3://docs-bucket/extra.md")),
                    reference("Fifth".to_string(), Some("s3://docs-bucket/extra.md")),
                ],
            },
        ],
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub storage_path: String,
    pub retriever: Arc<MockRetriever>,
    pub model: Arc<MockTextModel>,
    pub ingestion: Arc<MockIngestion>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestProviders::default()).await
    }

    pub async fn spawn_with(providers: TestProviders) -> Self {
        let storage_path = format!("target/test-storage-{}", Uuid::new_v4());

        let config = ChatbotConfig {
            common: CoreConfig {
                port: 0, // Random port for testing
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
            knowledge_base: KnowledgeBaseConfig {
                id: providers.knowledge_base_id.clone(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                bucket: None,
                local_path: storage_path.clone(),
            },
            model: ModelConfig {
                model_id: DEFAULT_MODEL_ID.to_string(),
                region: "us-east-1".to_string(),
            },
        };

        let storage = LocalStorage::new(&storage_path)
            .await
            .expect("Failed to create test storage");

        let chat = ChatService::new(
            providers.retriever.clone(),
            providers.model.clone(),
            config.knowledge_base.id.clone(),
            config.model.model_arn(),
        );

        let state = AppState {
            config: Arc::new(config),
            storage: Arc::new(storage),
            chat,
            ingestion: providers.ingestion.clone(),
        };

        let app = Application::build_with_state(0, state)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            storage_path,
            retriever: providers.retriever,
            model: providers.model,
            ingestion: providers.ingestion,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_path).await;
    }
}

/// Status and parsed JSON body of a response.
pub async fn json_response(response: reqwest::Response) -> (u16, serde_json::Value) {
    let status = response.status().as_u16();
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Response body is not JSON");
    (status, body)
}
