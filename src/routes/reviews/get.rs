use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::REVIEW_NOT_FOUND;
use crate::{
    error::ApiError,
    models::ReviewStatus,
    repository::{run_blocking, Repository, ReviewFilter},
    utils::{PageQuery, PageRequest, Paginated, Pagination},
    views::{review_view, review_views}
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery{
    pub dish_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<ReviewStatus>,
    pub featured: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>
}

#[tracing::instrument(
    "Get list of reviews",
    skip(repo)
)]
pub async fn list_reviews(
    repo: web::Data<dyn Repository>,
    query: web::Query<ReviewQuery>
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = PageRequest::try_from(PageQuery{ page: query.page, limit: query.limit })?;
    let filter = ReviewFilter{
        dish_id: query.dish_id,
        user_id: query.user_id,
        status: query.status,
        featured: query.featured
    };

    let body = run_blocking(&repo, move |repo| {
        let (reviews, total) = repo.list_reviews(&filter, page)?;

        Ok(Paginated{
            items: review_views(repo, reviews)?,
            pagination: Pagination::new(page, total)
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(body))
}

#[tracing::instrument(
    "Get review by id",
    skip(repo)
)]
pub async fn get_review(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError> {
    let review_id = path.into_inner();

    let view = run_blocking(&repo, move |repo| {
        let review = repo.find_review(review_id)?
            .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
        Ok(review_view(repo, review)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
