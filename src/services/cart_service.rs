use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    dto::cart::{CartItemDto, CartList},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        games::Entity as Games,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::game_service,
    state::AppState,
};

/// Fetch the user's cart, lazily creating an empty one. Collections are
/// normally created at registration; this path covers accounts where that
/// step failed partway.
pub async fn get_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<CartModel> {
    let existing = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(cart) = existing {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(cart)
}

pub async fn list_cart(
    state: &AppState,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let cart = get_or_create_cart(&state.orm, user_id).await?;

    let finder = CartItems::find().filter(CartItemCol::CartId.eq(cart.id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Games)
        .order_by_desc(CartItemCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(item, game)| {
            game.map(|game| CartItemDto {
                id: item.id,
                game: game_service::game_from_entity(game),
                quantity: item.quantity,
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Add a game to the cart. An existing line for the same game has its
/// quantity overwritten, not incremented.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    game_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<CartItemDto>> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let game = game_service::find_game(&state.orm, game_id).await?;
    let cart = get_or_create_cart(&state.orm, user_id).await?;

    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::GameId.eq(game_id))
        .one(&state.orm)
        .await?;

    let item = if let Some(item) = existing {
        let mut active: CartItemActive = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?
    } else {
        CartItemActive {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            game_id: Set(game_id),
            quantity: Set(quantity),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::CartUpdate,
        Some("cart_items"),
        Some(serde_json::json!({ "game_id": game_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "OK",
        CartItemDto {
            id: item.id,
            game: game_service::game_from_entity(game),
            quantity: item.quantity,
        },
        None,
    ))
}

/// Replace the quantity of an existing cart line.
pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    game_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<CartItemDto>> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = get_or_create_cart(&state.orm, user_id).await?;
    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::GameId.eq(game_id))
        .one(&state.orm)
        .await?;

    let item = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let game = game_service::find_game(&state.orm, game_id).await?;

    let mut active: CartItemActive = item.into();
    active.quantity = Set(quantity);
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::CartUpdate,
        Some("cart_items"),
        Some(serde_json::json!({ "game_id": game_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "OK",
        CartItemDto {
            id: item.id,
            game: game_service::game_from_entity(game),
            quantity: item.quantity,
        },
        None,
    ))
}

/// Removing an absent item is not an error.
pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    game_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let cart = get_or_create_cart(&state.orm, user_id).await?;

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::GameId.eq(game_id))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::CartRemove,
        Some("cart_items"),
        Some(serde_json::json!({ "game_id": game_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Removed from cart"))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let cart = get_or_create_cart(&state.orm, user_id).await?;

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::CartClear,
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Cart cleared"))
}
