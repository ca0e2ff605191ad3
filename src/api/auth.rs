//! Authenticated principal.
//!
//! Authentication happens upstream; the proxy forwards the principal id in a
//! configured header. A missing, blank, or non-UTF-8 value is rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::AppState;

/// The caller every habit operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.auth_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Principal(id.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}
