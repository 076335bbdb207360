use secrecy::SecretString;

use super::{
    bounded_text::BoundedText, new_password::NewPassword, phone_number::PhoneNumberDomain,
    user_email::UserEmail
};
use crate::models::Role;

pub const MAX_NAME_LENGTH: usize = 100;

// Validated account data shared by signup and user administration
#[derive(Debug)]
pub struct NewUser{
    pub name: BoundedText,
    pub email: UserEmail,
    pub password: NewPassword,
    pub telephone: Option<PhoneNumberDomain>,
    pub role: Role
}

impl NewUser {
    pub fn parse(
        name: String,
        email: String,
        password: SecretString,
        telephone: Option<String>,
        role: Option<Role>
    ) -> Result<NewUser, String> {
        Ok(Self{
            name: BoundedText::parse(name, "name", 1, MAX_NAME_LENGTH)?,
            email: UserEmail::parse(email)?,
            password: NewPassword::parse(password)?,
            telephone: parse_telephone(telephone)?,
            role: role.unwrap_or_default()
        })
    }
}

// Blank telephone means none
pub fn parse_telephone(telephone: Option<String>) -> Result<Option<PhoneNumberDomain>, String> {
    match telephone {
        Some(number) if !number.trim().is_empty() => PhoneNumberDomain::parse(number).map(Some),
        _ => Ok(None)
    }
}
