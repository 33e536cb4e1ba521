use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RefreshRequest, SignupRequest},
        cart::{CartItemDto, CartList, CartQuantityRequest},
        favorites::FavoriteGameList,
        games::{CreateGameRequest, GameList, UpdateGameRequest},
        library::LibraryGameList,
        orders::{
            CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
        users::{UpdateUserRequest, UserList},
    },
    models::{Category, Developer, Game, Order, OrderItem, Review, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, catalog, favorites, games, health, library, orders, params, reviews, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::refresh,
        users::list_users,
        users::get_user,
        users::update_user,
        games::list_games,
        games::search_games,
        games::games_by_category,
        games::get_game,
        games::create_game,
        games::update_game,
        games::delete_game,
        catalog::list_categories,
        catalog::list_developers,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        favorites::get_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        favorites::clear_favorites,
        library::get_library,
        orders::create_order_from_cart,
        orders::create_order,
        orders::get_order,
        orders::get_user_orders,
        orders::list_all_orders,
        orders::update_order_status,
        reviews::create_review,
        reviews::get_review,
        reviews::list_reviews_by_game,
        reviews::update_review,
        reviews::delete_review
    ),
    components(
        schemas(
            User,
            Game,
            Developer,
            Category,
            Order,
            OrderItem,
            Review,
            SignupRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            UpdateUserRequest,
            UserList,
            CreateGameRequest,
            UpdateGameRequest,
            GameList,
            CartQuantityRequest,
            CartItemDto,
            CartList,
            FavoriteGameList,
            LibraryGameList,
            OrderItemRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            params::Pagination,
            params::GameQuery,
            params::OrderListQuery,
            params::SortOrder,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<Game>,
            ApiResponse<GameList>,
            ApiResponse<AuthResponse>,
            ApiResponse<CartList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<ReviewList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup, login and token refresh"),
        (name = "Users", description = "Account management endpoints"),
        (name = "Games", description = "Game catalog endpoints"),
        (name = "Catalog", description = "Category and developer listings"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Library", description = "Owned games"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "Reviews", description = "Game review endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
