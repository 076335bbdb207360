use config::{Config, Environment, File};
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::Pool;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{domain::user_email::UserEmail, email_client::EmailClient, utils::DbPool};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings{
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JWTSettings,
    pub email: EmailSettings
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings{
    pub host: String,
    pub port: u16,
    // Origin allowed by CORS, the festival frontend
    pub frontend_url: String,
    // Public URL used when building links sent by email
    pub base_url: String
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings{
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub name: String,
    pub max_connections: u32,
    pub require_ssl: bool,
    // Serve from process memory instead of postgres
    #[serde(default)]
    pub in_memory: bool
}

#[derive(Deserialize, Debug, Clone)]
pub struct JWTSettings{
    pub secret: SecretString,
    pub expiry_hours: u64,
    pub reset_expiry_minutes: u64
}

#[derive(Deserialize, Debug, Clone)]
pub struct EmailSettings{
    pub api_uri: String,
    pub sender: String,
    pub authorization_token: SecretString,
    pub timeout_seconds: u64
}

impl Settings{
    // Reads configuration/base.yaml, then APP_SECTION__KEY environment overrides
    pub fn get() -> Result<Self, config::ConfigError>{
        Config::builder()
            .add_source(File::with_name("configuration/base.yaml"))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
            )
            .build()?
            .try_deserialize::<Settings>()
    }
}

impl DatabaseSettings {
    // Url of the server, used to create databases
    pub fn get_database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port
        )
    }

    pub fn get_database_table_url(&self) -> String {
        let ssl_mode = if self.require_ssl { "require" } else { "prefer" };
        format!("{}/{}?sslmode={}", self.get_database_url(), self.name, ssl_mode)
    }

    pub fn build_pool(&self) -> Result<DbPool, r2d2::Error> {
        Pool::builder()
            .max_size(self.max_connections)
            .build(ConnectionManager::<PgConnection>::new(self.get_database_table_url()))
    }
}

impl EmailSettings {
    pub fn client(&self) -> Result<EmailClient, anyhow::Error> {
        let sender = UserEmail::parse(self.sender.clone())
            .map_err(|e| anyhow::anyhow!(e))?;

        EmailClient::new(
            self.api_uri.clone(),
            sender,
            self.authorization_token.clone(),
            self.timeout_seconds
        )
    }
}
