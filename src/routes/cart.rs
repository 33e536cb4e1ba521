use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{CartItemDto, CartList, CartQuantityRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    response::ApiResponse,
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_cart))
        .route("/{user_id}/add/{game_id}", post(add_to_cart))
        .route("/{user_id}/update/{game_id}", patch(update_cart_item))
        .route("/{user_id}/remove/{game_id}", delete(remove_from_cart))
        .route("/{user_id}/clear", delete(clear_cart))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List cart items", body = ApiResponse<CartList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    ensure_owner(&user, user_id)?;
    let resp = cart_service::list_cart(&state, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/{user_id}/add/{game_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    request_body = CartQuantityRequest,
    responses(
        (status = 200, description = "Add or overwrite cart item", body = ApiResponse<CartItemDto>),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Game not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, game_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CartQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartItemDto>>> {
    ensure_owner(&user, user_id)?;
    let resp = cart_service::add_to_cart(&state, &user, user_id, game_id, payload.quantity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/v1/cart/{user_id}/update/{game_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    request_body = CartQuantityRequest,
    responses(
        (status = 200, description = "Replace cart item quantity", body = ApiResponse<CartItemDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, game_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CartQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartItemDto>>> {
    ensure_owner(&user, user_id)?;
    let resp =
        cart_service::update_cart_item(&state, &user, user_id, game_id, payload.quantity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/{user_id}/remove/{game_id}",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Removed (absent item is not an error)", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, game_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_owner(&user, user_id)?;
    let resp = cart_service::remove_from_cart(&state, &user, user_id, game_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/{user_id}/clear",
    params(("user_id" = Uuid, Path, description = "Cart owner")),
    responses(
        (status = 200, description = "Cart cleared", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_owner(&user, user_id)?;
    let resp = cart_service::clear_cart(&state, &user, user_id).await?;
    Ok(Json(resp))
}
