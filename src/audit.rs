use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Closed set of actions the store writes to the audit trail, so log
/// queries can rely on the stored strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    TokenRefresh,
    UserUpdate,
    GameCreate,
    GameUpdate,
    GameDelete,
    CartUpdate,
    CartRemove,
    CartClear,
    FavoriteAdd,
    FavoriteRemove,
    FavoriteClear,
    Checkout,
    OrderCreate,
    OrderStatusUpdate,
    ReviewCreate,
    ReviewUpdate,
    ReviewDelete,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::TokenRefresh => "token_refresh",
            AuditAction::UserUpdate => "user_update",
            AuditAction::GameCreate => "game_create",
            AuditAction::GameUpdate => "game_update",
            AuditAction::GameDelete => "game_delete",
            AuditAction::CartUpdate => "cart_update",
            AuditAction::CartRemove => "cart_remove",
            AuditAction::CartClear => "cart_clear",
            AuditAction::FavoriteAdd => "favorite_add",
            AuditAction::FavoriteRemove => "favorite_remove",
            AuditAction::FavoriteClear => "favorite_clear",
            AuditAction::Checkout => "checkout",
            AuditAction::OrderCreate => "order_create",
            AuditAction::OrderStatusUpdate => "order_status_update",
            AuditAction::ReviewCreate => "review_create",
            AuditAction::ReviewUpdate => "review_update",
            AuditAction::ReviewDelete => "review_delete",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: AuditAction,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings_are_stable_and_snake_case() {
        assert_eq!(AuditAction::Checkout.as_str(), "checkout");
        assert_eq!(
            AuditAction::OrderStatusUpdate.as_str(),
            "order_status_update"
        );
        assert_eq!(AuditAction::TokenRefresh.as_str(), "token_refresh");
        assert!(
            AuditAction::CartUpdate
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_')
        );
    }
}
