mod me;
mod reset_password;
mod signin;
mod signup;

pub use me::*;
pub use reset_password::*;
pub use signin::*;
pub use signup::*;
