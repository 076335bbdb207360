use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    domain::new_user::NewUser,
    error::ApiError,
    models::Role,
    repository::{run_blocking, Repository},
    routes::insert_new_user,
    views::PublicUser
};

#[derive(Deserialize, Debug)]
pub struct CreateUserJson{
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub telephone: Option<String>,
    pub role: Option<Role>
}

#[tracing::instrument(
    "Creating user account",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn create_user(
    repo: web::Data<dyn Repository>,
    json: web::Json<CreateUserJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::User, Action::Create, Ownership::Other)?;

    let json = json.into_inner();
    let new_user = NewUser::parse(json.name, json.email, json.password, json.telephone, json.role)
        .map_err(ApiError::Validation)?;

    let user = run_blocking(&repo, move |repo| insert_new_user(repo, new_user)).await?;

    Ok(HttpResponse::Created().json(PublicUser::from(user)))
}
