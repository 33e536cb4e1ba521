use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    dto::favorites::FavoriteGameList,
    entity::{
        favorite_items::{
            ActiveModel as FavoriteItemActive, Column as FavoriteItemCol, Entity as FavoriteItems,
        },
        favorites::{
            ActiveModel as FavoriteActive, Column as FavoriteCol, Entity as Favorites,
            Model as FavoriteModel,
        },
        games::Entity as Games,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Game,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::game_service,
    state::AppState,
};

pub async fn get_or_create_favorite<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<FavoriteModel> {
    let existing = Favorites::find()
        .filter(FavoriteCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(favorite) = existing {
        return Ok(favorite);
    }

    let favorite = FavoriteActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(favorite)
}

pub async fn list_favorites(
    state: &AppState,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteGameList>> {
    let (page, limit, offset) = pagination.normalize();
    let favorite = get_or_create_favorite(&state.orm, user_id).await?;

    let finder = FavoriteItems::find().filter(FavoriteItemCol::FavoriteId.eq(favorite.id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items: Vec<Game> = finder
        .find_also_related(Games)
        .order_by_desc(FavoriteItemCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, game)| game.map(game_service::game_from_entity))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        FavoriteGameList { items },
        Some(meta),
    ))
}

/// Re-adding an already-favorited game is a silent no-op.
pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    game_id: Uuid,
) -> AppResult<ApiResponse<Game>> {
    let game = game_service::find_game(&state.orm, game_id).await?;
    let favorite = get_or_create_favorite(&state.orm, user_id).await?;

    let existing = FavoriteItems::find()
        .filter(FavoriteItemCol::FavoriteId.eq(favorite.id))
        .filter(FavoriteItemCol::GameId.eq(game_id))
        .one(&state.orm)
        .await?;

    if existing.is_none() {
        FavoriteItemActive {
            id: Set(Uuid::new_v4()),
            favorite_id: Set(favorite.id),
            game_id: Set(game_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::FavoriteAdd,
        Some("favorite_items"),
        Some(serde_json::json!({ "game_id": game_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to favorites",
        game_service::game_from_entity(game),
        Some(Meta::empty()),
    ))
}

/// Removing an absent item is not an error.
pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    game_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let favorite = get_or_create_favorite(&state.orm, user_id).await?;

    FavoriteItems::delete_many()
        .filter(FavoriteItemCol::FavoriteId.eq(favorite.id))
        .filter(FavoriteItemCol::GameId.eq(game_id))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::FavoriteRemove,
        Some("favorite_items"),
        Some(serde_json::json!({ "game_id": game_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Removed from favorites"))
}

pub async fn clear_favorites(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let favorite = get_or_create_favorite(&state.orm, user_id).await?;

    FavoriteItems::delete_many()
        .filter(FavoriteItemCol::FavoriteId.eq(favorite.id))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::FavoriteClear,
        Some("favorite_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Favorites cleared"))
}
