use actix_web::{web, HttpResponse};
use anyhow::Context;
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::jwt::Tokenizer,
    domain::new_user::NewUser,
    error::ApiError,
    models::{Role, User},
    password::compute_password_hash,
    repository::{run_blocking, Repository},
    views::AuthResponse
};

pub const EMAIL_TAKEN: &str = "Email already in use";

#[derive(Deserialize, Debug)]
pub struct SignupJson{
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub telephone: Option<String>,
    pub role: Option<Role>
}

#[tracing::instrument(
    "User signup started",
    skip(json, repo, tokenizer),
    fields(email = %json.email)
)]
pub async fn signup(
    json: web::Json<SignupJson>,
    repo: web::Data<dyn Repository>,
    tokenizer: web::Data<Tokenizer>
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    let new_user = NewUser::parse(json.name, json.email, json.password, json.telephone, json.role)
        .map_err(ApiError::Validation)?;

    let user = run_blocking(&repo, move |repo| insert_new_user(repo, new_user)).await?;

    let token = tokenizer.generate_key(&user)
        .context("Failed to sign access token")?;

    Ok(HttpResponse::Created().json(AuthResponse{
        message: "Signup successful".to_string(),
        user: user.into(),
        token
    }))
}

// Hashes the password and stores the account, runs on the blocking pool
#[tracing::instrument(
    "Inserting user into the database",
    skip_all
)]
pub fn insert_new_user(repo: &dyn Repository, new_user: NewUser) -> Result<User, ApiError> {
    if repo.find_user_by_email(new_user.email.as_ref())?.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.into()))
    }

    let password_hash = compute_password_hash(new_user.password.secret())?;

    let now = Utc::now();
    let user = User{
        id: Uuid::new_v4(),
        name: new_user.name.into_inner(),
        email: new_user.email.inner(),
        password: password_hash,
        telephone: new_user.telephone.map(|telephone| telephone.inner()),
        role: new_user.role,
        created_at: now,
        updated_at: now
    };

    repo.insert_user(user)
        .map_err(|e| ApiError::from_store(e, "User not found", EMAIL_TAKEN))
}
