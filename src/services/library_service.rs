use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::library::LibraryGameList,
    entity::{
        games::Entity as Games,
        libraries::{
            ActiveModel as LibraryActive, Column as LibraryCol, Entity as Libraries,
            Model as LibraryModel,
        },
        library_items::{
            ActiveModel as LibraryItemActive, Column as LibraryItemCol, Entity as LibraryItems,
        },
    },
    error::AppResult,
    models::Game,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::game_service,
    state::AppState,
};

pub async fn get_or_create_library<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<LibraryModel> {
    let existing = Libraries::find()
        .filter(LibraryCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(library) = existing {
        return Ok(library);
    }

    let library = LibraryActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(library)
}

/// Idempotent entitlement grant used by checkout: ensure a library item
/// exists for every given game, creating the library itself if needed.
/// Runs on the caller's connection so checkout can pass its transaction.
pub async fn grant_games<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    game_ids: &[Uuid],
) -> AppResult<()> {
    let library = get_or_create_library(conn, user_id).await?;

    for &game_id in game_ids {
        let existing = LibraryItems::find()
            .filter(LibraryItemCol::LibraryId.eq(library.id))
            .filter(LibraryItemCol::GameId.eq(game_id))
            .one(conn)
            .await?;

        if existing.is_none() {
            LibraryItemActive {
                id: Set(Uuid::new_v4()),
                library_id: Set(library.id),
                game_id: Set(game_id),
                created_at: NotSet,
            }
            .insert(conn)
            .await?;
        }
    }

    Ok(())
}

pub async fn list_library(
    state: &AppState,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<LibraryGameList>> {
    let (page, limit, offset) = pagination.normalize();
    let library = get_or_create_library(&state.orm, user_id).await?;

    let finder = LibraryItems::find().filter(LibraryItemCol::LibraryId.eq(library.id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items: Vec<Game> = finder
        .find_also_related(Games)
        .order_by_desc(LibraryItemCol::CreatedAt)
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
        LibraryGameList { items },
        Some(meta),
    ))
}
