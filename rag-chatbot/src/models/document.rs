use serde::Serialize;

/// An object in the document bucket, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDescriptor {
    pub key: String,
    pub size: i64,
}
