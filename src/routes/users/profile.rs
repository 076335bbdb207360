use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{apply_user_changes, user_changes};
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    repository::{run_blocking, Repository},
    views::PublicUser
};

// No role field: a `role` sent by the client is dropped during deserialisation
#[derive(Deserialize, Debug)]
pub struct ProfileJson{
    pub name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>
}

#[tracing::instrument(
    "Updating own profile",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn update_profile(
    repo: web::Data<dyn Repository>,
    json: web::Json<ProfileJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::Profile, Action::Update, Ownership::Own)?;

    let json = json.into_inner();
    let changes = user_changes(json.name, json.email, json.telephone, None)?;
    let id = actor.user_id;

    let user = run_blocking(&repo, move |repo| apply_user_changes(repo, id, changes)).await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}
