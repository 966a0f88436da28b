/// Bearer token extraction for authenticated endpoints.
use crate::db::{Database, DbPool, StoreError};
use actix_web::{http::header, HttpRequest};

/// Pull the raw token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the calling user, or fail with 401
pub async fn authenticate(req: &HttpRequest, pool: &DbPool) -> Result<i64, StoreError> {
    let token = bearer_token(req).ok_or(StoreError::Unauthorized)?;
    Database::user_for_token(pool, token).await
}
