use actix_web::{web, HttpResponse};
use anyhow::Context;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    auth::jwt::Tokenizer,
    error::ApiError,
    password::verify_password,
    repository::{run_blocking, Repository},
    views::AuthResponse
};

// Same answer for an unknown email and a wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Deserialize, Debug)]
pub struct SigninJson{
    pub email: String,
    pub password: SecretString
}

#[tracing::instrument(
    "Signing in user",
    skip(json, repo, tokenizer),
    fields(email = %json.email)
)]
pub async fn signin(
    json: web::Json<SigninJson>,
    repo: web::Data<dyn Repository>,
    tokenizer: web::Data<Tokenizer>
) -> Result<HttpResponse, ApiError> {
    let SigninJson{ email, password } = json.into_inner();

    let user = run_blocking(&repo, move |repo| {
        let user = match repo.find_user_by_email(email.trim())? {
            Some(user) => user,
            None => {
                tracing::info!("No user registered with this email");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()))
            }
        };

        if !verify_password(&password, &user.password)? {
            tracing::info!("Passwords did not match");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()))
        }

        Ok(user)
    })
    .await?;

    let token = tokenizer.generate_key(&user)
        .context("Failed to sign access token")?;

    Ok(HttpResponse::Ok().json(AuthResponse{
        message: "Signin successful".to_string(),
        user: user.into(),
        token
    }))
}
