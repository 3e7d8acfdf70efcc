pub mod chat;
pub mod providers;
pub mod storage;

pub use chat::{ChatService, RetrievalOutcome};
pub use providers::{Ingestion, Retriever, TextModel};
pub use storage::{LocalStorage, S3Storage, Storage};
