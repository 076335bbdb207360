use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::DISH_NOT_FOUND;
use crate::{
    error::ApiError,
    models::ReviewStatus,
    repository::{run_blocking, DishFilter, Repository, ReviewFilter},
    utils::{PageQuery, PageRequest, Paginated, Pagination},
    views::{dish_view, dish_views, review_views, DishDetail}
};

// Approved reviews embedded in a dish detail
pub const DISH_DETAIL_REVIEWS: i64 = 20;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DishQuery{
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(alias = "userId")]
    pub owner_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>
}

impl DishQuery {
    fn into_parts(self) -> Result<(DishFilter, PageRequest), ApiError> {
        let page = PageRequest::try_from(PageQuery{ page: self.page, limit: self.limit })?;
        let filter = DishFilter{
            search: self.search
                .map(|search| search.trim().to_string())
                .filter(|search| !search.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            owner_id: self.owner_id
        };

        Ok((filter, page))
    }
}

#[tracing::instrument(
    "Get list of dishes",
    skip(repo)
)]
pub async fn list_dishes(
    repo: web::Data<dyn Repository>,
    query: web::Query<DishQuery>
) -> Result<HttpResponse, ApiError> {
    let (filter, page) = query.into_inner().into_parts()?;

    let body = run_blocking(&repo, move |repo| {
        let (dishes, total) = repo.list_dishes(&filter, page)?;

        Ok(Paginated{
            items: dish_views(repo, dishes)?,
            pagination: Pagination::new(page, total)
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(body))
}

#[tracing::instrument(
    "Get dish with its approved reviews",
    skip(repo)
)]
pub async fn get_dish(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>
) -> Result<HttpResponse, ApiError> {
    let dish_id = path.into_inner();

    let detail = run_blocking(&repo, move |repo| {
        let dish = repo.find_dish(dish_id)?
            .ok_or_else(|| ApiError::NotFound(DISH_NOT_FOUND.into()))?;

        let filter = ReviewFilter{
            dish_id: Some(dish_id),
            status: Some(ReviewStatus::Approved),
            ..Default::default()
        };
        let (reviews, _) = repo.list_reviews(&filter, PageRequest::new(1, DISH_DETAIL_REVIEWS)?)?;

        Ok(DishDetail{
            dish: dish_view(repo, dish)?,
            reviews: review_views(repo, reviews)?
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(detail))
}
