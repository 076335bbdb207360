mod authentication;
mod dishes;
mod health_check;
mod orders;
mod reviews;
mod users;

pub use authentication::*;
pub use dishes::*;
pub use health_check::*;
pub use orders::*;
pub use reviews::*;
pub use users::*;
