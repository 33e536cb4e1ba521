pub mod auth;
pub mod cart;
pub mod favorites;
pub mod games;
pub mod library;
pub mod orders;
pub mod reviews;
pub mod users;
