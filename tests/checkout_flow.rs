use game_store_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{auth::RefreshRequest, orders::UpdateOrderStatusRequest},
    entity::{categories::ActiveModel as CategoryActive, developers::ActiveModel as DeveloperActive, games::ActiveModel as GameActive},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{cart_service, favorite_service, library_service, order_service, user_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

const PAGE: Pagination = Pagination {
    page: Some(1),
    per_page: Some(50),
};

// Full store flow: signup -> browse -> cart -> checkout -> library, plus the
// invariants around it (quantity overwrite, price lock, empty-cart rejection,
// idempotent favorites, ownership, token refresh).
#[tokio::test]
async fn checkout_grants_library_and_clears_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = signup(&state, "player1", "player1@example.com").await?;
    let game_a = create_game(&state, "Ferris Quest", 999).await?;
    let game_b = create_game(&state, "Lifetime Wars", 500).await?;

    // Adding the same game twice overwrites the quantity.
    cart_service::add_to_cart(&state, &user, user.user_id, game_a, 1).await?;
    cart_service::add_to_cart(&state, &user, user.user_id, game_a, 2).await?;
    cart_service::add_to_cart(&state, &user, user.user_id, game_b, 1).await?;

    let cart = cart_service::list_cart(&state, user.user_id, PAGE).await?;
    let items = cart.data.unwrap().items;
    assert_eq!(items.len(), 2);
    let line_a = items.iter().find(|i| i.game.id == game_a).unwrap();
    assert_eq!(line_a.quantity, 2);

    let resp = order_service::create_order_from_cart(&state, &user, user.user_id).await?;
    let order = resp.data.unwrap();
    assert_eq!(order.order.total_cost, 2 * 999 + 500);
    assert_eq!(order.order.status, "new");
    assert_eq!(order.items.len(), 2);

    // Checkout emptied the cart and granted the games.
    let cart = cart_service::list_cart(&state, user.user_id, PAGE).await?;
    assert!(cart.data.unwrap().items.is_empty());

    let library = library_service::list_library(&state, user.user_id, PAGE).await?;
    let owned: Vec<Uuid> = library.data.unwrap().items.iter().map(|g| g.id).collect();
    assert!(owned.contains(&game_a));
    assert!(owned.contains(&game_b));

    // A second checkout on the now-empty cart is rejected.
    let err = order_service::create_order_from_cart(&state, &user, user.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    Ok(())
}

#[tokio::test]
async fn order_keeps_price_locked_after_catalog_change() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = signup(&state, "collector", "collector@example.com").await?;
    let game = create_game(&state, "Mutex Garden", 1000).await?;

    cart_service::add_to_cart(&state, &user, user.user_id, game, 1).await?;
    let order = order_service::create_order_from_cart(&state, &user, user.user_id)
        .await?
        .data
        .unwrap();

    // Raise the catalog price after the order exists.
    state
        .orm
        .execute(Statement::from_sql_and_values(
            state.orm.get_database_backend(),
            "UPDATE games SET price = 5000 WHERE id = $1",
            [game.into()],
        ))
        .await?;

    let reread = order_service::get_order(&state, &user, order.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reread.order.total_cost, 1000);
    assert_eq!(reread.items[0].price, 1000);

    Ok(())
}

#[tokio::test]
async fn failed_checkout_leaves_no_order_and_keeps_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = signup(&state, "unlucky", "unlucky@example.com").await?;
    let good = create_game(&state, "Ferris Quest", 999).await?;
    let doomed = create_game(&state, "Vaporware", 1500).await?;

    cart_service::add_to_cart(&state, &user, user.user_id, good, 1).await?;
    cart_service::add_to_cart(&state, &user, user.user_id, doomed, 1).await?;

    // Pull one game from the catalog so the price read inside the checkout
    // transaction fails partway through.
    state
        .orm
        .execute(Statement::from_sql_and_values(
            state.orm.get_database_backend(),
            "UPDATE games SET deleted_at = now() WHERE id = $1",
            [doomed.into()],
        ))
        .await?;

    let result = order_service::create_order_from_cart(&state, &user, user.user_id).await;
    assert!(result.is_err());

    // Nothing persisted: no order, no library grant, cart untouched.
    let orders = order_service::get_user_orders(&state, user.user_id, PAGE).await?;
    assert!(orders.data.unwrap().items.is_empty());

    let library = library_service::list_library(&state, user.user_id, PAGE).await?;
    assert!(library.data.unwrap().items.is_empty());

    let cart = cart_service::list_cart(&state, user.user_id, PAGE).await?;
    assert_eq!(cart.data.unwrap().items.len(), 2);

    Ok(())
}

#[tokio::test]
async fn favorites_are_idempotent_and_removal_is_quiet() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = signup(&state, "fan", "fan@example.com").await?;
    let game = create_game(&state, "Async Abyss", 2499).await?;

    favorite_service::add_favorite(&state, &user, user.user_id, game).await?;
    favorite_service::add_favorite(&state, &user, user.user_id, game).await?;

    let favorites = favorite_service::list_favorites(&state, user.user_id, PAGE).await?;
    assert_eq!(favorites.data.unwrap().items.len(), 1);

    favorite_service::remove_favorite(&state, &user, user.user_id, game).await?;
    // Removing again is not an error.
    favorite_service::remove_favorite(&state, &user, user.user_id, game).await?;

    let favorites = favorite_service::list_favorites(&state, user.user_id, PAGE).await?;
    assert!(favorites.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn admin_updates_status_and_owners_are_enforced() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = signup(&state, "buyer", "buyer@example.com").await?;
    let (other, _) = signup(&state, "stranger", "stranger@example.com").await?;
    let game = create_game(&state, "Ferris Quest", 999).await?;

    cart_service::add_to_cart(&state, &user, user.user_id, game, 1).await?;
    let order = order_service::create_order_from_cart(&state, &user, user.user_id)
        .await?
        .data
        .unwrap();

    // Another user cannot read the order.
    let err = order_service::get_order(&state, &other, order.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // The status overwrite takes any string.
    let admin = AuthUser {
        user_id: other.user_id,
        role: "admin".into(),
    };
    let updated = order_service::update_order_status(
        &state,
        &admin,
        order.order.id,
        UpdateOrderStatusRequest {
            status: "shipped-by-carrier-pigeon".into(),
        },
    )
    .await?;
    assert_eq!(updated.data.unwrap().status, "shipped-by-carrier-pigeon");

    // An admin can read any order.
    order_service::get_order(&state, &admin, order.order.id).await?;

    Ok(())
}

#[tokio::test]
async fn token_refresh_round_trip() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (_, refresh_token) = signup(&state, "returning", "returning@example.com").await?;

    let refreshed = user_service::refresh(
        &state,
        RefreshRequest {
            refresh_token: refresh_token.clone(),
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(refreshed.user.email, "returning@example.com");
    assert!(!refreshed.token.is_empty());
    assert_ne!(refreshed.refresh_token, "");

    // An access token is not accepted on the refresh path.
    let err = user_service::refresh(
        &state,
        RefreshRequest {
            refresh_token: refreshed.token,
        },
    )
    .await;
    assert!(err.is_err());

    Ok(())
}

/// Returns `None` when no database is configured so the suite can be run
/// without one.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;

    // Migrate and clean once per binary run; the tests in this file run in
    // parallel and share the database, so each one works with its own
    // accounts and catalog rows instead of truncating mid-flight.
    static PREPARE: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
    PREPARE
        .get_or_try_init(|| async {
            run_migrations(&orm).await?;
            let backend = orm.get_database_backend();
            orm.execute(Statement::from_string(
                backend,
                "TRUNCATE TABLE audit_logs, reviews, order_items, orders, library_items, libraries, favorite_items, favorites, cart_items, carts, games, categories, developers, users RESTART IDENTITY CASCADE",
            ))
            .await?;
            anyhow::Ok(())
        })
        .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        auth: game_store_api::config::AuthConfig::new("integration-test-secret"),
    };

    Ok(Some(AppState { pool, orm, config }))
}

/// Sign a user up through the real registration path and log in, returning
/// an [`AuthUser`] plus the refresh token.
async fn signup(
    state: &AppState,
    nickname: &str,
    email: &str,
) -> anyhow::Result<(AuthUser, String)> {
    use game_store_api::dto::auth::{LoginRequest, SignupRequest};

    user_service::register(
        state,
        SignupRequest {
            nickname: nickname.to_string(),
            email: email.to_string(),
            password: "hunter2!".into(),
            confirm_password: "hunter2!".into(),
        },
    )
    .await?;

    let auth = user_service::login(
        state,
        LoginRequest {
            email: email.to_string(),
            password: "hunter2!".into(),
        },
    )
    .await?
    .data
    .unwrap();

    Ok((
        AuthUser {
            user_id: auth.user.id,
            role: auth.user.role.clone(),
        },
        auth.refresh_token,
    ))
}

async fn create_game(state: &AppState, title: &str, price: i64) -> anyhow::Result<Uuid> {
    // Developer and category names are unique columns, so tag them with a
    // fresh id to keep parallel tests out of each other's way.
    let tag = Uuid::new_v4();
    let developer = DeveloperActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{title} Studio {tag}")),
        country: Set("".into()),
        description: Set("".into()),
        website_url: Set("".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{title} Genre {tag}")),
        description: Set("".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let game = GameActive {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set("A game for testing".into()),
        price: Set(price),
        release_date: Set(None),
        developer_id: Set(developer.id),
        category_id: Set(category.id),
        image_name: Set(None),
        image_data: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(game.id)
}
