use serde::Serialize;

/// Passage backing a knowledge-base answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub text: String,
    /// Storage URI of the cited document, empty when the service gave none.
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    KnowledgeBase,
    DirectModel,
}

/// Answer to a single chat question. Serialized as the `/chat` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResult {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub source: AnswerSource,
}

impl ChatResult {
    pub fn from_knowledge_base(answer: String, citations: Vec<Citation>) -> Self {
        Self {
            answer,
            citations,
            source: AnswerSource::KnowledgeBase,
        }
    }

    pub fn from_direct_model(answer: String) -> Self {
        Self {
            answer,
            citations: Vec::new(),
            source: AnswerSource::DirectModel,
        }
    }
}
