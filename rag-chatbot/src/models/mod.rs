pub mod chat;
pub mod document;

pub use chat::{AnswerSource, ChatResult, Citation};
pub use document::DocumentDescriptor;
