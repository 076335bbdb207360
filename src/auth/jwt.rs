use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{configuration::JWTSettings, models::{Role, User}};

#[derive(Clone)]
pub struct Tokenizer{
    pub secret: SecretString,
    pub expiry_hours: u64,
    pub reset_expiry_minutes: u64
}

impl Tokenizer {
    pub fn new(settings: &JWTSettings) -> Self {
        Self{
            secret: settings.secret.clone(),
            expiry_hours: settings.expiry_hours,
            reset_expiry_minutes: settings.reset_expiry_minutes
        }
    }

    // Bearer token returned by signup and signin
    pub fn generate_key(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error>{
        let expiry = Utc::now() + Duration::hours(self.expiry_hours as i64);
        self.encode(user, TokenKind::Access, expiry.timestamp())
    }

    // Short lived token embedded in password reset links
    pub fn generate_reset_key(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error>{
        let expiry = Utc::now() + Duration::minutes(self.reset_expiry_minutes as i64);
        self.encode(user, TokenKind::PasswordReset, expiry.timestamp())
    }

    fn encode(&self, user: &User, kind: TokenKind, expiry: i64) -> Result<String, jsonwebtoken::errors::Error>{
        let claims = Claims{
            sub: user.id,
            exp: expiry as usize,
            email: user.email.clone(),
            role: user.role,
            kind
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
        )
    }

    pub fn decode_key(&self, token: &str) -> Option<Claims>{
        match jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256)
        ) {
            Ok(decoded_data) => Some(decoded_data.claims),
            Err(_) => None
        }
    }

    pub fn decode_access_key(&self, token: &str) -> Option<Claims>{
        self.decode_key(token).filter(|claims| claims.kind == TokenKind::Access)
    }

    pub fn decode_reset_key(&self, token: &str) -> Option<Claims>{
        self.decode_key(token).filter(|claims| claims.kind == TokenKind::PasswordReset)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims{
    pub sub: Uuid,
    pub exp: usize,
    pub email: String,
    pub role: Role,
    pub kind: TokenKind
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind{
    Access,
    PasswordReset
}
