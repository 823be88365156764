//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::http::error::AppError;

/// The authenticated owner of the request, taken from the `x-owner-id`
/// header.
///
/// Session verification happens upstream; by the time a request reaches
/// these handlers the header carries an already-authenticated user id.
/// A missing or malformed header is rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct OwnerId(pub Uuid);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-owner-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing x-owner-id header".to_string()))?;

        let id = value
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized("x-owner-id is not a valid id".to_string()))?;

        Ok(OwnerId(id))
    }
}
