use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use bson::oid::ObjectId;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

/// The authenticated caller. Token issuance lives in the identity
/// service; this API only validates the shared-secret HS256 signature.
pub struct AuthUser {
    pub user_id: ObjectId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as ObjectId hex.
    pub sub: String,
    pub exp: usize,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected bearer token".to_string()))?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.settings.auth.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

        let user_id = ObjectId::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid subject claim".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
