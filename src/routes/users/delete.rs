use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::USER_NOT_FOUND;
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
    "Deleting user by id",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn delete_user(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    authorize(&actor, Resource::User, Action::Delete, Ownership::of(&actor, id))?;

    run_blocking(&repo, move |repo| {
        repo.delete_user(id)
            .map_err(|e| ApiError::from_store(e, USER_NOT_FOUND, "User could not be deleted"))
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
