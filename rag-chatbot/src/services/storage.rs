use crate::models::DocumentDescriptor;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use service_core::error::AppError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Keys returned by a single listing call, matching the S3 page size.
pub const LIST_PAGE_SIZE: usize = 1000;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `data` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError>;

    /// First page of objects in key order.
    async fn list(&self) -> Result<Vec<DocumentDescriptor>, AppError>;
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Resolves `key` inside the base directory. Only plain relative
    /// segments are accepted, so a key can never address a file outside it.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Invalid storage key: {}",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DocumentDescriptor>, AppError> {
        let mut documents = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                } else if let Some(key) = self.key_for(&entry.path()) {
                    documents.push(DocumentDescriptor {
                        key,
                        size: metadata.len() as i64,
                    });
                }
            }
        }

        documents.sort_by(|a, b| a.key.cmp(&b.key));
        documents.truncate(LIST_PAGE_SIZE);
        Ok(documents)
    }
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!(
                    "S3 upload failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DocumentDescriptor>, AppError> {
        // Continuation tokens are not followed.
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!(
                    "S3 list failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        if output.is_truncated().unwrap_or(false) {
            tracing::warn!(bucket = %self.bucket, "Object listing truncated to first page");
        }

        Ok(output
            .contents()
            .iter()
            .map(|object| DocumentDescriptor {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or_default(),
            })
            .collect())
    }
}
