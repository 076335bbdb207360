use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{repository::StoreError, utils::error_fmt_chain};

// Error returned by every handler, rendered as `{"error": "..."}`
#[derive(Error)]
pub enum ApiError{
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody{
    pub error: String
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        if let ApiError::UnexpectedError(_) = self {
            tracing::error!(error = ?self, "Request failed unexpectedly");
        }

        HttpResponse::build(self.status_code())
            .json(ErrorBody{ error: self.to_string() })
    }
}

impl ApiError {
    pub fn from_store(error: StoreError, not_found: &str, conflict: &str) -> Self {
        match error {
            StoreError::NotFound => ApiError::NotFound(not_found.to_string()),
            StoreError::Conflict(_) => ApiError::Conflict(conflict.to_string()),
            StoreError::UnexpectedError(e) => ApiError::UnexpectedError(e)
        }
    }
}

// Bare `?` on a repository call: anything but Unexpected is a bug at the call site
impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UnexpectedError(e) => ApiError::UnexpectedError(e),
            other => ApiError::UnexpectedError(anyhow::Error::new(other))
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::UnexpectedError(anyhow::Error::new(error).context("Failed due to threadpool error"))
    }
}
