use crate::dtos::HealthResponse;
use crate::envelope::ResponseEnvelope;
use crate::startup::AppState;
use service_core::error::AppError;

pub const SERVICE_NAME: &str = "rag-chatbot";

pub async fn health_check(state: &AppState) -> Result<ResponseEnvelope, AppError> {
    Ok(ResponseEnvelope::ok(&HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        knowledge_base_id: state.config.knowledge_base.id.clone(),
    }))
}
