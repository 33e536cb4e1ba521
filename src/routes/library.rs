use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::library::LibraryGameList,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    response::ApiResponse,
    routes::params::Pagination,
    services::library_service,
    state::AppState,
};

// The library is read-only over HTTP; entitlements are granted by checkout.
pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", get(get_library))
}

#[utoipa::path(
    get,
    path = "/api/v1/library/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Library owner"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List owned games", body = ApiResponse<LibraryGameList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
pub async fn get_library(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<LibraryGameList>>> {
    ensure_owner(&user, user_id)?;
    let resp = library_service::list_library(&state, user_id, pagination).await?;
    Ok(Json(resp))
}
