//! Session endpoints. The OAuth exchange itself happens outside this
//! service; these routes gate session creation on the allow-listed email
//! domain and manage the in-memory session map.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::session::{email_domain_allowed, UserInfo};
use crate::state::AppState;

/// Identity asserted by the upstream auth flow.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// POST /api/v1/auth/session — create a session for an authorized
/// identity. Identities outside the allowed domain never get a session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> ApiResult<Json<Value>> {
    let Some(email) = request.email.filter(|e| !e.trim().is_empty()) else {
        return Err(ApiError::BadRequest("missing 'email'".into()));
    };

    if !email_domain_allowed(&email, &state.config.allowed_email_domain) {
        tracing::warn!(email = %email, "session refused: email domain not authorized");
        return Err(ApiError::Unauthorized(
            "email domain not authorized".into(),
        ));
    }

    let name = request.name.unwrap_or_else(|| email.clone());
    let session_id = state.sessions.create(UserInfo { name, email }).await;
    Ok(Json(json!({
        "session_id": session_id,
        "expires_in": "24h",
    })))
}

/// GET /api/v1/auth/session/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::Unauthorized("invalid or expired session".into()))?;
    Ok(Json(json!({"user": user, "session": "active"})))
}

/// GET /api/v1/auth/verify/{id}
pub async fn verify_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::Unauthorized("invalid or expired session".into()))?;
    Ok(Json(json!({"valid": true, "user": user, "expires_in": "24h"})))
}

/// POST /api/v1/auth/logout/{id} — always succeeds outwardly.
pub async fn logout(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    state.sessions.clear(&session_id).await;
    Json(json!({"success": true}))
}
