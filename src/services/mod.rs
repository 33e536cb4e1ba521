pub mod auth_service;
pub mod cart_service;
pub mod favorite_service;
pub mod game_service;
pub mod library_service;
pub mod order_service;
pub mod review_service;
pub mod user_service;
