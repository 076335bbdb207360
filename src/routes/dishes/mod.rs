mod delete;
mod get;
mod post;
mod update;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use update::*;

pub const DISH_NOT_FOUND: &str = "Dish not found";
