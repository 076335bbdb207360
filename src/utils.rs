use std::error::Error;

use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::{Pool, PooledConnection};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub fn error_fmt_chain(f: &mut std::fmt::Formatter<'_>, source: &Option<impl Error>) -> std::fmt::Result{
    if let Some(error) = source{
        write!(f, "\n\tCaused By:\n\t")?;
        write!(f, "{:?}", &error)?;
        error_fmt_chain(f, &error.source())
    } else {
        Ok(())
    }
}

// `page` / `limit` query parameters shared by every list endpoint
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct PageQuery{
    pub page: Option<i64>,
    pub limit: Option<i64>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest{
    pub page: i64,
    pub limit: i64
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Result<Self, ApiError> {
        if page < 1 {
            return Err(ApiError::Validation("page must be a positive integer".into()))
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(
                format!("limit must be between 1 and {}", MAX_PAGE_LIMIT)
            ))
        }

        // The row offset must fit in an i64
        if (page - 1).checked_mul(limit).is_none() {
            return Err(ApiError::Validation("page is out of range".into()))
        }

        Ok(Self{ page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl TryFrom<PageQuery> for PageRequest {
    type Error = ApiError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination{
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        Self{
            page: request.page,
            limit: request.limit,
            total,
            pages: (total + request.limit - 1) / request.limit
        }
    }
}

// Body of every list endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct Paginated<T>{
    pub items: Vec<T>,
    pub pagination: Pagination
}

// Generic `{message}` body
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse{
    pub message: String
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self{ message: message.into() }
    }
}
