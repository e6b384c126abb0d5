//! Session extractor.
//!
//! The storefront pages generate a random id once per browser profile and
//! send it on every cart/checkout call:
//!
//! ```text
//! X-Session-Id: 3f2c9a1e-tab
//!        │
//!        ▼
//! SessionId::from_request_parts ──► validate_session_id ──► handler
//!        │ (missing / malformed)
//!        ▼
//! 400 { "code": "VALIDATION_ERROR", "message": "session id is required" }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dentica_core::validation::validate_session_id;
use dentica_core::ValidationError;

use crate::error::ApiError;

/// Header carrying the cart session key.
pub const SESSION_HEADER: &str = "x-session-id";

/// A validated cart session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| ValidationError::required("session id"))?
            .to_str()
            .map_err(|_| {
                ValidationError::invalid_format("session id", "must be visible ASCII")
            })?
            .trim();

        validate_session_id(value)?;
        Ok(SessionId(value.to_string()))
    }
}
