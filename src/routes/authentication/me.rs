use actix_web::{web, HttpResponse};

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    repository::{run_blocking, Repository},
    views::PublicUser
};

#[tracing::instrument(
    "Get profile of logged in user",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn me(
    repo: web::Data<dyn Repository>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::Profile, Action::Read, Ownership::Own)?;
    let user_id = actor.user_id;

    let user = run_blocking(&repo, move |repo| {
        repo.find_user(user_id)?
            .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))
    })
    .await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}
