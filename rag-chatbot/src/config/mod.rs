use service_core::config::{self as core_config, get_env, get_optional_env, is_production};
use service_core::error::AppError;

/// Model used for both knowledge-base generation and direct completions.
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-micro-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub common: core_config::Config,
    pub knowledge_base: KnowledgeBaseConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBaseConfig {
    pub id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub local_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_id: String,
    pub region: String,
}

impl ModelConfig {
    /// Fully-qualified foundation model ARN passed to retrieve-and-generate.
    pub fn model_arn(&self) -> String {
        format!(
            "arn:aws:bedrock:{}::foundation-model/{}",
            self.region, self.model_id
        )
    }
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        let backend: StorageBackend = get_env("STORAGE_BACKEND", Some("s3"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let bucket = match backend {
            StorageBackend::S3 => Some(get_env("S3_BUCKET", None, is_prod)?),
            StorageBackend::Local => std::env::var("S3_BUCKET").ok(),
        };

        Ok(ChatbotConfig {
            common: common_config,
            knowledge_base: KnowledgeBaseConfig {
                id: get_optional_env("KNOWLEDGE_BASE_ID", is_prod)?,
            },
            storage: StorageConfig {
                backend,
                bucket,
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), false)?,
            },
            model: ModelConfig {
                model_id: get_env("MODEL_ID", Some(DEFAULT_MODEL_ID), false)?,
                region: get_env("AWS_REGION", Some(DEFAULT_REGION), false)?,
            },
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}
