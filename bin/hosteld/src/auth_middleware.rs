//! JWT validation middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it against the
//! shared secret and stores the decoded [`Claims`] in request extensions
//! for handlers to pick up via `Extension<Claims>`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hostel_core::error::error_code;
use hostel_core::Claims;
use jsonwebtoken::{DecodingKey, Validation};

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "missing authorization token".to_string(),
            AuthError::InvalidToken(e) => format!("invalid token: {}", e),
        };
        let body = serde_json::json!({
            "code": error_code::UNAUTHENTICATED,
            "message": message,
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}

/// Endpoints reachable without a token. `/files/` carries the public URLs
/// handed out for uploaded documents.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version") || path.starts_with("/files/")
}

#[cfg(test)]
mod tests {
    use super::is_public_path;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(is_public_path("/files/receipts/r1_123"));
        assert!(!is_public_path("/api/allocation"));
        assert!(!is_public_path("/files")); // only keys below the prefix
    }
}
