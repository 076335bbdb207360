use actix_web::{web, HttpResponse};
use anyhow::Context;
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::Instrument;

use crate::{
    auth::jwt::Tokenizer,
    domain::{new_password::NewPassword, user_email::UserEmail},
    email_client::EmailClient,
    error::ApiError,
    models::{User, UserChanges},
    password::compute_password_hash,
    repository::{run_blocking, Repository, StoreError},
    startup::ApplicationBaseUrl,
    utils::MessageResponse
};

// Returned whether or not the email is registered
pub const RESET_REQUESTED: &str = "If this email exists, a reset link has been sent";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

#[derive(Deserialize, Debug)]
pub struct ResetPasswordJson{
    pub email: String
}

#[derive(Deserialize, Debug)]
pub struct ConfirmResetJson{
    pub token: String,
    pub password: SecretString
}

#[tracing::instrument(
    "Requesting password reset",
    skip_all,
    fields(email = %json.email)
)]
pub async fn reset_password(
    json: web::Json<ResetPasswordJson>,
    repo: web::Data<dyn Repository>,
    tokenizer: web::Data<Tokenizer>,
    email_client: web::Data<EmailClient>,
    base_url: web::Data<ApplicationBaseUrl>
) -> Result<HttpResponse, ApiError> {
    let email = json.into_inner().email;

    let user = run_blocking(&repo, move |repo| {
        Ok(repo.find_user_by_email(email.trim())?)
    })
    .await?;

    // Delivery runs detached so known and unknown emails answer alike
    match user {
        Some(user) => {
            let base_url = base_url.0.clone();
            let task = async move {
                if let Err(e) = send_reset_link(&user, &tokenizer, &email_client, &base_url).await {
                    tracing::error!(error = ?e, "Failed to send password reset email");
                }
            };
            actix_web::rt::spawn(task.instrument(tracing::Span::current()));
        },
        None => tracing::info!("Password reset requested for an unknown email")
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new(RESET_REQUESTED)))
}

#[tracing::instrument(
    "Sending password reset link",
    skip_all,
    fields(user_id = %user.id)
)]
async fn send_reset_link(
    user: &User,
    tokenizer: &Tokenizer,
    email_client: &EmailClient,
    base_url: &str
) -> Result<(), anyhow::Error> {
    let token = tokenizer.generate_reset_key(user)
        .context("Failed to sign reset token")?;
    let recipient = UserEmail::parse(user.email.clone())
        .map_err(anyhow::Error::msg)?;

    let link = format!("{}/reset-password?token={}", base_url.trim_end_matches('/'), token);

    email_client.send_password_reset(&recipient, &link)
        .await
        .context("Email API rejected the reset email")?;

    Ok(())
}

#[tracing::instrument(
    "Confirming password reset",
    skip_all
)]
pub async fn confirm_reset_password(
    json: web::Json<ConfirmResetJson>,
    repo: web::Data<dyn Repository>,
    tokenizer: web::Data<Tokenizer>
) -> Result<HttpResponse, ApiError> {
    let ConfirmResetJson{ token, password } = json.into_inner();

    let claims = tokenizer.decode_reset_key(&token)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_RESET_TOKEN.into()))?;
    let password = NewPassword::parse(password)
        .map_err(ApiError::Validation)?;

    run_blocking(&repo, move |repo| {
        let password_hash = compute_password_hash(password.secret())?;
        let changes = UserChanges{
            password: Some(password_hash),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };

        match repo.update_user(claims.sub, changes) {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => Err(ApiError::Unauthorized(INVALID_RESET_TOKEN.into())),
            Err(e) => Err(e.into())
        }
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}
