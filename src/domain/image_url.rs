use validator::ValidateUrl;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn parse(url: String) -> Result<ImageUrl, String> {
        let trimmed = url.trim().to_string();
        if trimmed.validate_url() {
            Ok(Self(trimmed))
        } else {
            Err(format!("{} is not a valid image url", url))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
