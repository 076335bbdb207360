use secrecy::{ExposeSecret, SecretString};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// Password supplied at signup, account creation or reset
#[derive(Debug)]
pub struct NewPassword(SecretString);

impl NewPassword {
    pub fn parse(password: SecretString) -> Result<NewPassword, String> {
        let length = password.expose_secret().chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(format!("password must contain at least {} characters", MIN_PASSWORD_LENGTH))
        }

        if length > MAX_PASSWORD_LENGTH {
            return Err(format!("password must contain at most {} characters", MAX_PASSWORD_LENGTH))
        }

        Ok(Self(password))
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}
