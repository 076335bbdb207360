mod auth;
mod dishes;
mod health_check;
mod helpers;
mod users;
