//! Vehicle image analysis endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::vision::template_analysis;

/// Request body for an analysis call.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub image_base64: Option<String>,
    pub van_number: Option<String>,
}

/// POST /api/v1/analysis — run the vision analyzer over a vehicle image.
/// An absent or failing analyzer substitutes the fixed template; callers
/// never see an analysis error.
pub async fn analyze_vehicle(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<Value>> {
    let Some(image) = request.image_base64.filter(|i| !i.is_empty()) else {
        return Err(ApiError::BadRequest("missing 'image_base64'".into()));
    };
    let Some(van_number) = request.van_number.filter(|v| !v.is_empty()) else {
        return Err(ApiError::BadRequest("missing 'van_number'".into()));
    };

    let details = match state.vision.analyze(&image, &van_number).await {
        Some(text) => text,
        None => {
            tracing::debug!(van_number = %van_number, "vision analyzer unavailable, using template");
            template_analysis(&van_number)
        }
    };

    Ok(Json(json!({
        "status": "success",
        "van_number": van_number,
        "details": details,
    })))
}
