//! Natural-language chat endpoint: classify → dispatch → format.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use fp_protocol::intent::ConversationTurn;

use crate::assist::{dispatch, format};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn default_style() -> String {
    "plain".to_string()
}

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub message: Option<String>,
    /// Rolling history, most recent last.
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    /// "plain" strips decorative symbols from the reply.
    #[serde(default = "default_style")]
    pub style: String,
}

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<Value>> {
    let Some(message) = request.message.as_deref().map(str::trim).filter(|m| !m.is_empty())
    else {
        return Err(ApiError::BadRequest("missing 'message' in request body".into()));
    };

    let intent = state.classifier.classify(message, &request.history).await;
    let executed = dispatch::execute(state.crm.as_ref(), state.telematics.as_ref(), intent).await;
    let text = format::format_response(&executed);

    let plain = request.style == "plain";
    let response = format::sanitize(&text, plain, plain);

    Ok(Json(json!({
        "status": "success",
        "intent": executed.intent.intent,
        "count": executed.count,
        "response": response,
    })))
}
