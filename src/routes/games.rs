use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::games::{CreateGameRequest, GameList, UpdateGameRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Game,
    response::ApiResponse,
    routes::params::{GameQuery, Pagination},
    services::game_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route("/search", get(search_games))
        .route("/category/{category_id}", get(games_by_category))
        .route(
            "/{game_id}",
            get(get_game).patch(update_game).delete(delete_game),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/games",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List games", body = ApiResponse<GameList>),
    ),
    tag = "Games"
)]
pub async fn list_games(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<GameList>>> {
    let resp = game_service::list_games(
        &state.orm,
        GameQuery {
            pagination,
            q: None,
        },
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/search",
    params(
        ("q" = Option<String>, Query, description = "Title substring"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Search games by title", body = ApiResponse<GameList>),
    ),
    tag = "Games"
)]
pub async fn search_games(
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
) -> AppResult<Json<ApiResponse<GameList>>> {
    let resp = game_service::list_games(&state.orm, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/category/{category_id}",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Games in a category", body = ApiResponse<GameList>),
    ),
    tag = "Games"
)]
pub async fn games_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<GameList>>> {
    let resp = game_service::games_by_category(&state.orm, category_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}",
    params(("game_id" = Uuid, Path, description = "Game ID")),
    responses(
        (status = 200, description = "Get game", body = ApiResponse<Game>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Games"
)]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Game>>> {
    let resp = game_service::get_game(&state.orm, game_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created (admin only)", body = ApiResponse<Game>),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Games"
)]
pub async fn create_game(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateGameRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Game>>)> {
    ensure_admin(&user)?;
    let resp = game_service::create_game(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/games/{game_id}",
    params(("game_id" = Uuid, Path, description = "Game ID")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated (admin only)", body = ApiResponse<Game>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Games"
)]
pub async fn update_game(
    State(state): State<AppState>,
    user: AuthUser,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<UpdateGameRequest>,
) -> AppResult<Json<ApiResponse<Game>>> {
    ensure_admin(&user)?;
    let resp = game_service::update_game(&state, &user, game_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/games/{game_id}",
    params(("game_id" = Uuid, Path, description = "Game ID")),
    responses(
        (status = 200, description = "Game deleted (admin only)", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Games"
)]
pub async fn delete_game(
    State(state): State<AppState>,
    user: AuthUser,
    Path(game_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = game_service::delete_game(&state, &user, game_id).await?;
    Ok(Json(resp))
}
