mod delete;
mod get;
mod post;
mod secret_code;
mod update;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use secret_code::*;
pub use update::*;

pub const ORDER_NOT_FOUND: &str = "Order not found";
