pub mod auth;
pub mod role;
