//! Request normalization and dispatch.

use crate::envelope::ResponseEnvelope;
use crate::handlers::{self, JsonBody};
use crate::startup::AppState;
use axum::body::Bytes;
use service_core::error::AppError;

/// Deployment stage prefixes, checked in this order.
pub const STAGE_PREFIXES: [&str; 3] = ["/dev", "/staging", "/prod"];

#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub method: String,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    Chat,
    Upload,
    ListDocuments,
    Sync,
}

/// Strips the first matching stage prefix. An empty remainder becomes `/`.
pub fn normalize_path(path: &str) -> &str {
    for stage in STAGE_PREFIXES {
        if let Some(rest) = path.strip_prefix(stage) {
            return if rest.is_empty() { "/" } else { rest };
        }
    }
    path
}

pub fn resolve_operation(path: &str, method: &str) -> Option<Operation> {
    match (method, path) {
        ("GET", "/health") => Some(Operation::Health),
        ("POST", "/chat") => Some(Operation::Chat),
        ("POST", "/upload") => Some(Operation::Upload),
        ("GET", "/documents") => Some(Operation::ListDocuments),
        ("POST", "/sync") => Some(Operation::Sync),
        _ => None,
    }
}

/// Runs one request to completion. Always yields an envelope: unmatched
/// routes become 404 and handler failures become their error envelope.
pub async fn dispatch(state: &AppState, request: Request) -> ResponseEnvelope {
    let path = normalize_path(&request.path);

    let result = match resolve_operation(path, &request.method) {
        Some(operation) => run(state, operation, &request.body).await,
        None => Err(AppError::not_found(format!(
            "Not found: {} {}",
            request.method, path
        ))),
    };

    match result {
        Ok(envelope) => {
            tracing::info!(
                method = %request.method,
                path = %path,
                status = envelope.status_code,
                "Request completed"
            );
            envelope
        }
        Err(err) => {
            let envelope = ResponseEnvelope::from(&err);
            if envelope.status_code >= 500 {
                tracing::error!(
                    method = %request.method,
                    path = %path,
                    status = envelope.status_code,
                    error = %err.message(),
                    "Request failed"
                );
            } else {
                tracing::info!(
                    method = %request.method,
                    path = %path,
                    status = envelope.status_code,
                    error = %err.message(),
                    "Request rejected"
                );
            }
            envelope
        }
    }
}

async fn run(
    state: &AppState,
    operation: Operation,
    body: &Bytes,
) -> Result<ResponseEnvelope, AppError> {
    match operation {
        Operation::Health => handlers::health_check(state).await,
        Operation::Chat => handlers::chat(state, &parse_body(body)?).await,
        Operation::Upload => handlers::upload_document(state, &parse_body(body)?).await,
        Operation::ListDocuments => handlers::list_documents(state).await,
        Operation::Sync => handlers::sync_knowledge_base(state).await,
    }
}

/// Parses the body as a JSON object; an absent or blank body is `{}`.
fn parse_body(body: &Bytes) -> Result<JsonBody, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonBody::new());
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_stage_prefix() {
        assert_eq!(normalize_path("/prod/chat"), "/chat");
        assert_eq!(normalize_path("/staging/documents"), "/documents");
        assert_eq!(normalize_path("/dev/health"), "/health");
    }

    #[test]
    fn bare_stage_becomes_root() {
        assert_eq!(normalize_path("/dev"), "/");
        assert_eq!(normalize_path("/prod"), "/");
    }

    #[test]
    fn strips_only_one_prefix() {
        assert_eq!(normalize_path("/dev/prod/chat"), "/prod/chat");
    }

    #[test]
    fn unprefixed_paths_are_untouched() {
        assert_eq!(normalize_path("/chat"), "/chat");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn dispatch_table_matches_path_and_method() {
        assert_eq!(resolve_operation("/health", "GET"), Some(Operation::Health));
        assert_eq!(resolve_operation("/chat", "POST"), Some(Operation::Chat));
        assert_eq!(resolve_operation("/upload", "POST"), Some(Operation::Upload));
        assert_eq!(
            resolve_operation("/documents", "GET"),
            Some(Operation::ListDocuments)
        );
        assert_eq!(resolve_operation("/sync", "POST"), Some(Operation::Sync));
    }

    #[test]
    fn wrong_method_or_unknown_path_is_unmatched() {
        assert_eq!(resolve_operation("/chat", "GET"), None);
        assert_eq!(resolve_operation("/documents", "POST"), None);
        assert_eq!(resolve_operation("/foo", "DELETE"), None);
        assert_eq!(resolve_operation("/chat/", "POST"), None);
    }

    #[test]
    fn blank_body_parses_as_empty_object() {
        assert!(parse_body(&Bytes::new()).unwrap().is_empty());
        assert!(parse_body(&Bytes::from_static(b"  \n")).unwrap().is_empty());
    }

    #[test]
    fn non_object_body_is_internal_error() {
        let err = parse_body(&Bytes::from_static(b"[1, 2]")).unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
        assert!(parse_body(&Bytes::from_static(b"{not json")).is_err());
    }
}
