use axum::{
    Json,
    extract::{Path, State},
};
use bson::oid::ObjectId;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(language_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = ObjectId::parse_str(&language_id)
        .map_err(|_| ApiError::BadRequest("Invalid language_id".to_string()))?;

    let record = state
        .proficiency
        .find(auth.user_id, lid)
        .await?
        .ok_or_else(|| ApiError::NotFound("No committed proficiency for language".to_string()))?;

    Ok(Json(serde_json::json!({
        "language_id": language_id,
        "level": record.level,
        "confidence": record.confidence,
        "assessed_at": record.assessed_at.to_rfc3339(),
    })))
}
