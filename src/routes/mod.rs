use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod favorites;
pub mod games;
pub mod health;
pub mod library;
pub mod orders;
pub mod params;
pub mod reviews;
pub mod users;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/games", games::router())
        .nest("/cart", cart::router())
        .nest("/favorite", favorites::router())
        .nest("/library", library::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .merge(catalog::router())
}
