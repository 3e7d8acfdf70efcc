use super::JsonBody;
use crate::envelope::ResponseEnvelope;
use crate::startup::AppState;
use serde_json::Value;
use service_core::error::AppError;

pub async fn chat(state: &AppState, body: &JsonBody) -> Result<ResponseEnvelope, AppError> {
    let question = resolve_question(body);
    if question.is_empty() {
        return Err(AppError::bad_request("Question required"));
    }

    tracing::info!(question_len = question.len(), "Chat question received");

    let result = state.chat.answer(question).await?;

    tracing::info!(
        source = ?result.source,
        citations = result.citations.len(),
        "Chat answered"
    );

    Ok(ResponseEnvelope::ok(&result))
}

/// `question` wins whenever the key is present, even if empty; `message` is
/// only consulted when `question` is absent.
fn resolve_question(body: &JsonBody) -> &str {
    body.get("question")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> JsonBody {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn question_key_takes_precedence() {
        let body = body(json!({"question": "q", "message": "m"}));
        assert_eq!(resolve_question(&body), "q");
    }

    #[test]
    fn message_is_used_when_question_absent() {
        let body = body(json!({"message": "x"}));
        assert_eq!(resolve_question(&body), "x");
    }

    #[test]
    fn empty_question_does_not_fall_through_to_message() {
        let body = body(json!({"question": "", "message": "m"}));
        assert_eq!(resolve_question(&body), "");
    }

    #[test]
    fn missing_or_non_string_question_is_empty() {
        assert_eq!(resolve_question(&JsonBody::new()), "");
        assert_eq!(resolve_question(&body(json!({"question": null}))), "");
        assert_eq!(resolve_question(&body(json!({"question": 42}))), "");
    }
}
