use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    domain::{bounded_text::BoundedText, rating::Rating},
    error::ApiError,
    models::{Review, ReviewStatus},
    repository::{run_blocking, Repository},
    routes::DISH_NOT_FOUND,
    views::review_view
};

pub const ALREADY_REVIEWED: &str = "You have already reviewed this dish";
pub const MAX_COMMENT_LENGTH: usize = 1000;

pub fn parse_rating(rating: i32) -> Result<i32, ApiError> {
    Rating::parse(rating)
        .map(|rating| rating.value())
        .map_err(ApiError::Validation)
}

pub fn parse_comment(comment: String, field: &str) -> Result<String, ApiError> {
    BoundedText::parse(comment, field, 1, MAX_COMMENT_LENGTH)
        .map(BoundedText::into_inner)
        .map_err(ApiError::Validation)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewJson{
    pub dish_id: Uuid,
    pub rating: i32,
    pub comment: String
}

#[tracing::instrument(
    "Posting review",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id, dish_id = %json.dish_id)
)]
pub async fn create_review(
    repo: web::Data<dyn Repository>,
    json: web::Json<ReviewJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::Review, Action::Create, Ownership::Own)?;

    let json = json.into_inner();
    let rating = parse_rating(json.rating)?;
    let comment = parse_comment(json.comment, "comment")?;
    let dish_id = json.dish_id;
    let user_id = actor.user_id;

    let view = run_blocking(&repo, move |repo| {
        if repo.find_dish(dish_id)?.is_none() {
            return Err(ApiError::NotFound(DISH_NOT_FOUND.into()))
        }

        if repo.find_review_by_author(user_id, dish_id)?.is_some() {
            return Err(ApiError::Conflict(ALREADY_REVIEWED.into()))
        }

        let now = Utc::now();
        let review = repo.insert_review(Review{
            id: Uuid::new_v4(),
            user_id,
            dish_id,
            rating,
            comment,
            status: ReviewStatus::Pending,
            featured: false,
            created_at: now,
            updated_at: now
        })
        .map_err(|e| ApiError::from_store(e, DISH_NOT_FOUND, ALREADY_REVIEWED))?;

        Ok(review_view(repo, review)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(view))
}
