//! Application startup and lifecycle management.

use crate::config::{ChatbotConfig, StorageBackend};
use crate::envelope::ResponseEnvelope;
use crate::router::{self, Request};
use crate::services::providers::bedrock::{BedrockIngestion, BedrockRetriever, BedrockTextModel};
use crate::services::{ChatService, Ingestion, LocalStorage, S3Storage, Storage};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Method, Uri},
    middleware, Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Largest accepted request body, matching the API gateway payload limit.
pub const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Collaborators shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatbotConfig>,
    pub storage: Arc<dyn Storage>,
    pub chat: ChatService,
    pub ingestion: Arc<dyn Ingestion>,
}

impl AppState {
    /// Builds AWS-backed collaborators from the configuration.
    pub async fn from_config(config: ChatbotConfig) -> Result<Self, AppError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.model.region.clone()))
            .load()
            .await;

        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::S3 => {
                let bucket = config.storage.bucket.clone().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("S3_BUCKET is required but not set"))
                })?;
                tracing::info!(bucket = %bucket, "Using S3 document storage");
                Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&sdk_config), bucket))
            }
            StorageBackend::Local => {
                let path = &config.storage.local_path;
                let storage = LocalStorage::new(path).await.map_err(|e| {
                    tracing::error!("Failed to initialize local storage at {}: {}", path, e);
                    e
                })?;
                tracing::info!(path = %path, "Using local document storage");
                Arc::new(storage)
            }
        };

        let chat = ChatService::new(
            Arc::new(BedrockRetriever::new(&sdk_config)),
            Arc::new(BedrockTextModel::new(&sdk_config, &config.model.model_id)),
            config.knowledge_base.id.clone(),
            config.model.model_arn(),
        );

        tracing::info!(
            model = %config.model.model_id,
            knowledge_base_id = ?config.knowledge_base.id,
            "Initialized Bedrock providers"
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            chat,
            ingestion: Arc::new(BedrockIngestion::new(&sdk_config)),
        })
    }
}

/// Every request goes through [`router::dispatch`]; axum never answers on
/// its own.
pub fn app(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> ResponseEnvelope {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return ResponseEnvelope::error(rejection.status(), rejection.body_text()),
    };

    router::dispatch(
        &state,
        Request {
            path: uri.path().to_string(),
            method: method.as_str().to_string(),
            body,
        },
    )
    .await
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        let port = config.common.port;
        let state = AppState::from_config(config).await?;
        Self::build_with_state(port, state).await
    }

    /// Binds the listener for an already assembled state (port 0 picks a
    /// random port).
    pub async fn build_with_state(port: u16, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, app(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
