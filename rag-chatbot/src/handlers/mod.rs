pub mod chat;
pub mod documents;
pub mod health;
pub mod sync;

pub use chat::chat;
pub use documents::{list_documents, upload_document};
pub use health::health_check;
pub use sync::sync_knowledge_base;

use serde_json::{Map, Value};

/// Request body fields, parsed from the JSON object sent by the caller.
pub type JsonBody = Map<String, Value>;

/// String value of `key`, treating a missing, non-string or empty value as
/// absent.
pub(crate) fn non_empty_str<'a>(body: &'a JsonBody, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
