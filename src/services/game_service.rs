use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    dto::games::{CreateGameRequest, GameList, UpdateGameRequest},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        developers::{Column as DeveloperCol, Entity as Developers, Model as DeveloperModel},
        games::{ActiveModel as GameActive, Column as GameCol, Entity as Games, Model as GameModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Developer, Game},
    response::{ApiResponse, Meta},
    routes::params::{GameQuery, Pagination},
    state::AppState,
};

/// Catalog lookup: resolve a live (not soft-deleted) game. This is the
/// authoritative price source for checkout.
pub async fn find_game<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<GameModel> {
    let game = Games::find_by_id(id)
        .filter(GameCol::DeletedAt.is_null())
        .one(conn)
        .await?;
    game.ok_or(AppError::NotFound)
}

pub async fn get_game(
    conn: &sea_orm::DatabaseConnection,
    id: Uuid,
) -> AppResult<ApiResponse<Game>> {
    let game = find_game(conn, id).await?;
    Ok(ApiResponse::success(
        "OK",
        game_from_entity(game),
        Some(Meta::empty()),
    ))
}

pub async fn list_games(
    conn: &sea_orm::DatabaseConnection,
    query: GameQuery,
) -> AppResult<ApiResponse<GameList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut finder = Games::find().filter(GameCol::DeletedAt.is_null());
    if let Some(q) = query.q.as_ref().filter(|q| !q.is_empty()) {
        finder = finder.filter(GameCol::Title.contains(q));
    }
    finder = finder.order_by_desc(GameCol::CreatedAt);

    let total = finder.clone().count(conn).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(conn)
        .await?
        .into_iter()
        .map(game_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", GameList { items }, Some(meta)))
}

pub async fn games_by_category(
    conn: &sea_orm::DatabaseConnection,
    category_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<GameList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Games::find()
        .filter(GameCol::DeletedAt.is_null())
        .filter(GameCol::CategoryId.eq(category_id))
        .order_by_desc(GameCol::CreatedAt);

    let total = finder.clone().count(conn).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(conn)
        .await?
        .into_iter()
        .map(game_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", GameList { items }, Some(meta)))
}

pub async fn create_game(
    state: &AppState,
    user: &AuthUser,
    payload: CreateGameRequest,
) -> AppResult<ApiResponse<Game>> {
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let developer = Developers::find_by_id(payload.developer_id)
        .one(&state.orm)
        .await?;
    if developer.is_none() {
        return Err(AppError::BadRequest("developer not found".into()));
    }
    let category = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?;
    if category.is_none() {
        return Err(AppError::BadRequest("category not found".into()));
    }

    let game = GameActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        description: Set(payload.description),
        price: Set(payload.price),
        release_date: Set(payload.release_date),
        developer_id: Set(payload.developer_id),
        category_id: Set(payload.category_id),
        image_name: Set(None),
        image_data: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::GameCreate,
        Some("games"),
        Some(serde_json::json!({ "game_id": game.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Game created",
        game_from_entity(game),
        None,
    ))
}

pub async fn update_game(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateGameRequest,
) -> AppResult<ApiResponse<Game>> {
    let existing = find_game(&state.orm, id).await?;

    let mut active: GameActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if payload.release_date.is_some() {
        active.release_date = Set(payload.release_date);
    }
    if let Some(developer_id) = payload.developer_id {
        active.developer_id = Set(developer_id);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(Utc::now().into());
    let game = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::GameUpdate,
        Some("games"),
        Some(serde_json::json!({ "game_id": game.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Game updated",
        game_from_entity(game),
        Some(Meta::empty()),
    ))
}

/// Soft delete: orders and libraries keep referencing the row.
pub async fn delete_game(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_game(&state.orm, id).await?;

    let mut active: GameActive = existing.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::GameDelete,
        Some("games"),
        Some(serde_json::json!({ "game_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Game deleted"))
}

pub async fn list_categories(
    conn: &sea_orm::DatabaseConnection,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::success("OK", items, Some(Meta::empty())))
}

pub async fn list_developers(
    conn: &sea_orm::DatabaseConnection,
) -> AppResult<ApiResponse<Vec<Developer>>> {
    let items = Developers::find()
        .order_by_asc(DeveloperCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(developer_from_entity)
        .collect();
    Ok(ApiResponse::success("OK", items, Some(Meta::empty())))
}

pub fn game_from_entity(model: GameModel) -> Game {
    Game {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        release_date: model.release_date,
        developer_id: model.developer_id,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

fn developer_from_entity(model: DeveloperModel) -> Developer {
    Developer {
        id: model.id,
        name: model.name,
        country: model.country,
        description: model.description,
        website_url: model.website_url,
    }
}
