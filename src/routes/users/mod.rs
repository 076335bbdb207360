mod delete;
mod get;
mod post;
mod profile;
mod update;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use profile::*;
pub use update::*;

pub const USER_NOT_FOUND: &str = "User not found";
