use std::fmt::Debug;

use phonenumber::country;

// National numbers without a country prefix are read as French numbers
const DEFAULT_REGION: country::Id = country::FR;

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneNumberDomain(pub String);

impl PhoneNumberDomain{
    pub fn parse(number: String) -> Result<PhoneNumberDomain, String>{
        let trimmed = number.trim();
        if !trimmed.is_empty() && phonenumber::parse(Some(DEFAULT_REGION), trimmed).is_ok(){
            Ok(Self(trimmed.to_string()))
        } else {
            Err(format!("{} is not a valid telephone number", number))
        }
    }

    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

impl std::fmt::Display for PhoneNumberDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
