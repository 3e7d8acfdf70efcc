//! Uniform response envelope returned by every dispatched request.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use service_core::error::AppError;
use std::collections::BTreeMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const ALLOW_ALL_ORIGINS: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON object.
    pub body: String,
}

impl ResponseEnvelope {
    pub fn new<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_body(status, body),
            Err(e) => Self::with_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }).to_string(),
            ),
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, &json!({ "error": message.into() }))
    }

    fn with_body(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            (
                header::CONTENT_TYPE.as_str().to_string(),
                CONTENT_TYPE_JSON.to_string(),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_ORIGIN.as_str().to_string(),
                ALLOW_ALL_ORIGINS.to_string(),
            ),
        ]);

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

impl From<&AppError> for ResponseEnvelope {
    fn from(err: &AppError) -> Self {
        Self::error(err.status_code(), err.message())
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Body::from(self.body)).into_response();

        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
}
