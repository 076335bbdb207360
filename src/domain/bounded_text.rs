// Trimmed free text with a character count between `min` and `max`
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedText(String);

impl BoundedText {
    pub fn parse(value: String, field: &str, min: usize, max: usize) -> Result<BoundedText, String> {
        let trimmed = value.trim();
        let length = trimmed.chars().count();

        if length < min {
            return Err(format!("{} must contain at least {} characters", field, min))
        }

        if length > max {
            return Err(format!("{} must contain at most {} characters", field, max))
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
