use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::USER_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    domain::{
        bounded_text::BoundedText,
        new_user::{parse_telephone, MAX_NAME_LENGTH},
        user_email::UserEmail
    },
    error::ApiError,
    models::{Role, User, UserChanges},
    repository::{run_blocking, Repository},
    routes::EMAIL_TAKEN,
    views::PublicUser
};

#[derive(Deserialize, Debug)]
pub struct UpdateUserJson{
    pub name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<Role>
}

// Validates the present fields of a partial account update
pub fn user_changes(
    name: Option<String>,
    email: Option<String>,
    telephone: Option<String>,
    role: Option<Role>
) -> Result<UserChanges, ApiError> {
    let name = name
        .map(|name| BoundedText::parse(name, "name", 1, MAX_NAME_LENGTH).map(BoundedText::into_inner))
        .transpose()
        .map_err(ApiError::Validation)?;
    let email = email
        .map(|email| UserEmail::parse(email).map(|email| email.inner()))
        .transpose()
        .map_err(ApiError::Validation)?;
    let telephone = parse_telephone(telephone)
        .map_err(ApiError::Validation)?
        .map(|telephone| telephone.inner());

    Ok(UserChanges{
        name,
        email,
        password: None,
        telephone,
        role,
        updated_at: Some(Utc::now())
    })
}

// Email uniqueness is checked against every other account
pub fn apply_user_changes(repo: &dyn Repository, id: Uuid, changes: UserChanges) -> Result<User, ApiError> {
    if let Some(email) = changes.email.as_deref() {
        if repo.find_user_by_email(email)?.map_or(false, |other| other.id != id) {
            return Err(ApiError::Conflict(EMAIL_TAKEN.into()))
        }
    }

    repo.update_user(id, changes)
        .map_err(|e| ApiError::from_store(e, USER_NOT_FOUND, EMAIL_TAKEN))
}

#[tracing::instrument(
    "Updating user account",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn update_user(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    json: web::Json<UpdateUserJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    authorize(&actor, Resource::User, Action::Update, Ownership::of(&actor, id))?;

    let json = json.into_inner();
    let changes = user_changes(json.name, json.email, json.telephone, json.role)?;

    let user = run_blocking(&repo, move |repo| apply_user_changes(repo, id, changes)).await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}
