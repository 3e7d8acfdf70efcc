use crate::dtos::SyncResponse;
use crate::envelope::ResponseEnvelope;
use crate::startup::AppState;
use service_core::error::AppError;

pub async fn sync_knowledge_base(state: &AppState) -> Result<ResponseEnvelope, AppError> {
    let knowledge_base_id = state.config.knowledge_base.id.as_deref().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("KNOWLEDGE_BASE_ID is not configured"))
    })?;

    let data_sources = state.ingestion.list_data_sources(knowledge_base_id).await?;
    let data_source_id = data_sources
        .first()
        .ok_or_else(|| AppError::bad_request("No data source found"))?;

    let job = state
        .ingestion
        .start_ingestion_job(knowledge_base_id, data_source_id)
        .await?;

    tracing::info!(
        knowledge_base_id = %knowledge_base_id,
        data_source_id = %data_source_id,
        job_id = %job.job_id,
        status = %job.status,
        "Ingestion job started"
    );

    Ok(ResponseEnvelope::ok(&SyncResponse {
        message: "Sync started",
        job_id: job.job_id,
        status: job.status,
    }))
}
