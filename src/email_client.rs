use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::user_email::UserEmail;

pub const RESET_SUBJECT: &str = "Reset your password";

// Postmark style transactional email API, only used for password reset links
#[derive(Clone)]
pub struct EmailClient{
    http_client: Client,
    base_url: String,
    sender: UserEmail,
    server_token: SecretString
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct SendEmailRequest<'a>{
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub html_body: &'a str,
    pub text_body: &'a str
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: UserEmail,
        server_token: SecretString,
        timeout_secs: u64
    ) -> Result<EmailClient, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(EmailClient{
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
            server_token
        })
    }

    /// Mails `link` to `recipient`. A non 2xx answer from the API is an error.
    #[tracing::instrument(
        "Sending password reset email",
        skip_all,
        fields(recipient = %recipient.as_ref())
    )]
    pub async fn send_password_reset(&self, recipient: &UserEmail, link: &str) -> Result<(), reqwest::Error> {
        let html_body = format!("Follow this <a href=\"{}\">link</a> to choose a new password.", link);
        let text_body = format!("Visit {} to choose a new password.", link);

        let body = SendEmailRequest{
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject: RESET_SUBJECT,
            html_body: &html_body,
            text_body: &text_body
        };

        self.http_client
            .post(format!("{}/email", self.base_url))
            .header("X-Postmark-Server-Token", self.server_token.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
