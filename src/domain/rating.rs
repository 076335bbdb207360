pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating(i32);

impl Rating {
    pub fn parse(value: i32) -> Result<Rating, String> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("rating must be between {} and {}", MIN_RATING, MAX_RATING))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}
