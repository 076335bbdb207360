mod delete;
mod get;
mod post;
mod reply;
mod update;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use reply::*;
pub use update::*;

pub const REVIEW_NOT_FOUND: &str = "Review not found";
