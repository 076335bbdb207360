use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_comment, REVIEW_NOT_FOUND};
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::ReviewReply,
    repository::{run_blocking, Repository},
    views::reply_view
};

#[derive(Deserialize, Debug)]
pub struct ReplyJson{
    pub content: String
}

#[tracing::instrument(
    "Replying to review",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn create_review_reply(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    json: web::Json<ReplyJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let review_id = path.into_inner();
    let content = json.into_inner().content;

    let view = run_blocking(&repo, move |repo| {
        let review = repo.find_review(review_id)?
            .ok_or_else(|| ApiError::NotFound(REVIEW_NOT_FOUND.into()))?;
        authorize(&actor, Resource::ReviewReply, Action::Create, Ownership::of(&actor, review.user_id))?;

        let reply = repo.insert_reply(ReviewReply{
            id: Uuid::new_v4(),
            review_id,
            user_id: actor.user_id,
            content: parse_comment(content, "content")?,
            created_at: Utc::now()
        })
        .map_err(|e| ApiError::from_store(e, REVIEW_NOT_FOUND, "Reply could not be created"))?;

        Ok(reply_view(repo, reply)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(view))
}
