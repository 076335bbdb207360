use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_comment, parse_rating, REVIEW_NOT_FOUND};
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::{ReviewChanges, ReviewStatus},
    repository::{run_blocking, Repository},
    views::review_view
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewJson{
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub status: Option<ReviewStatus>,
    pub featured: Option<bool>
}

impl UpdateReviewJson {
    fn moderates(&self) -> bool {
        self.status.is_some() || self.featured.is_some()
    }

    fn into_changes(self) -> Result<ReviewChanges, ApiError> {
        Ok(ReviewChanges{
            rating: self.rating.map(parse_rating).transpose()?,
            comment: self.comment
                .map(|comment| parse_comment(comment, "comment"))
                .transpose()?,
            status: self.status,
            featured: self.featured,
            updated_at: Some(Utc::now())
        })
    }
}

#[tracing::instrument(
    "Updating review",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn update_review(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    json: web::Json<UpdateReviewJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let review_id = path.into_inner();
    let json = json.into_inner();

    let view = run_blocking(&repo, move |repo| {
        let review = repo.find_review(review_id)?
            .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
        let ownership = Ownership::of(&actor, review.user_id);

        authorize(&actor, Resource::Review, Action::Update, ownership)?;
        // Moderation fields reject the whole request, nothing is applied
        if json.moderates() {
            authorize(&actor, Resource::Review, Action::Moderate, ownership)?;
        }

        let review = repo.update_review(review_id, json.into_changes()?)
            .map_err(|e| ApiError::from_store(e, REVIEW_NOT_FOUND, "Review could not be updated"))?;
        Ok(review_view(repo, review)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
