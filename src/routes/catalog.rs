use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult,
    models::{Category, Developer},
    response::ApiResponse,
    services::game_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/developers", get(list_developers))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<Vec<Category>>),
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let resp = game_service::list_categories(&state.orm).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/developers",
    responses(
        (status = 200, description = "List developers", body = ApiResponse<Vec<Developer>>),
    ),
    tag = "Catalog"
)]
pub async fn list_developers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Developer>>>> {
    let resp = game_service::list_developers(&state.orm).await?;
    Ok(Json(resp))
}
