use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::REVIEW_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    repository::{run_blocking, Repository},
    utils::MessageResponse
};

#[tracing::instrument(
    "Deleting review by id",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn delete_review(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let review_id = path.into_inner();

    run_blocking(&repo, move |repo| {
        let review = repo.find_review(review_id)?
            .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
        authorize(&actor, Resource::Review, Action::Delete, Ownership::of(&actor, review.user_id))?;

        repo.delete_review(review_id)
            .map_err(|e| ApiError::from_store(e, REVIEW_NOT_FOUND, "Review could not be deleted"))
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Review deleted successfully")))
}
