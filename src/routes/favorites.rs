use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::favorites::FavoriteGameList,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    models::Game,
    response::ApiResponse,
    routes::params::Pagination,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_favorites))
        .route("/{user_id}/add/{game_id}", post(add_favorite))
        .route("/{user_id}/remove/{game_id}", delete(remove_favorite))
        .route("/{user_id}/clear", delete(clear_favorites))
}

#[utoipa::path(
    get,
    path = "/api/v1/favorite/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Favorites owner"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List favorite games", body = ApiResponse<FavoriteGameList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn get_favorites(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<FavoriteGameList>>> {
    ensure_owner(&user, user_id)?;
    let resp = favorite_service::list_favorites(&state, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/favorite/{user_id}/add/{game_id}",
    params(
        ("user_id" = Uuid, Path, description = "Favorites owner"),
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Added (re-add is a no-op)", body = ApiResponse<Game>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Game not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, game_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Game>>> {
    ensure_owner(&user, user_id)?;
    let resp = favorite_service::add_favorite(&state, &user, user_id, game_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/favorite/{user_id}/remove/{game_id}",
    params(
        ("user_id" = Uuid, Path, description = "Favorites owner"),
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Removed (absent item is not an error)", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, game_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_owner(&user, user_id)?;
    let resp = favorite_service::remove_favorite(&state, &user, user_id, game_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/favorite/{user_id}/clear",
    params(("user_id" = Uuid, Path, description = "Favorites owner")),
    responses(
        (status = 200, description = "Favorites cleared", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn clear_favorites(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_owner(&user, user_id)?;
    let resp = favorite_service::clear_favorites(&state, &user, user_id).await?;
    Ok(Json(resp))
}
