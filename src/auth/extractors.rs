use actix_web::{http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use super::jwt::Tokenizer;
use crate::{error::ApiError, models::Role};

// Caller resolved from a valid access token in the Authorization header
#[derive(Debug, Clone)]
pub struct AuthenticatedUser{
    pub user_id: Uuid,
    pub email: String,
    pub role: Role
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[tracing::instrument(
    "Authenticating bearer token",
    skip_all,
    fields(user_id = tracing::field::Empty)
)]
fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let tokenizer = req.app_data::<web::Data<Tokenizer>>()
        .ok_or_else(|| ApiError::UnexpectedError(anyhow::anyhow!("Tokenizer missing from app data")))?;

    let header = req.headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

    let token = header.to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".into()))?;

    let claims = tokenizer.decode_access_key(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".into()))?;

    tracing::Span::current().record("user_id", tracing::field::display(&claims.sub));

    Ok(AuthenticatedUser{
        user_id: claims.sub,
        email: claims.email,
        role: claims.role
    })
}
