pub mod bounded_text;
pub mod image_url;
pub mod new_password;
pub mod new_user;
pub mod phone_number;
pub mod rating;
pub mod user_email;
