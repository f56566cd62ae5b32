pub mod auth;
pub mod conversion;
pub mod movie;
pub mod watchlist;
