use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    dto::auth::{AuthResponse, LoginRequest, RefreshRequest, SignupRequest},
    dto::users::{UpdateUserRequest, UserList},
    entity::{
        carts::ActiveModel as CartActive,
        favorites::ActiveModel as FavoriteActive,
        libraries::ActiveModel as LibraryActive,
        roles::{Column as RoleCol, Entity as Roles},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::{self, TokenIdentity},
    state::AppState,
};

const DEFAULT_ROLE: &str = "user";

/// Create the account plus its empty cart, favorites and library in one
/// transaction, so a usable account never exists without its collections.
pub async fn register(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<User>> {
    let SignupRequest {
        nickname,
        email,
        password,
        confirm_password,
    } = payload;

    if password != confirm_password {
        return Err(AppError::BadRequest("passwords do not match".into()));
    }
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }

    let taken = Users::find()
        .filter(UserCol::Nickname.eq(nickname.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("nickname already in use".into()));
    }

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("email already in use".into()));
    }

    let role = Roles::find()
        .filter(RoleCol::Kind.eq(DEFAULT_ROLE))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("default role missing")))?;

    let password_hash = auth_service::hash_password(&password)?;

    let txn = state.orm.begin().await?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        nickname: Set(nickname),
        email: Set(email),
        password_hash: Set(password_hash),
        role_id: Set(role.id),
        points: Set(0),
        access_token: Set(None),
        refresh_token: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    create_user_collections(&txn, user.id).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        AuditAction::UserRegister,
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user, role.kind),
        None,
    ))
}

async fn create_user_collections<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;

    FavoriteActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;

    LibraryActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;

    Ok(())
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;

    let found = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .filter(UserCol::DeletedAt.is_null())
        .find_also_related(Roles)
        .one(&state.orm)
        .await?;

    let (user, role) = match found {
        Some((user, Some(role))) => (user, role),
        _ => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    if !auth_service::verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let resp = issue_and_store_tokens(state, user, role.kind).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(resp.user.id),
        AuditAction::UserLogin,
        Some("users"),
        Some(serde_json::json!({ "user_id": resp.user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Validate the refresh token and issue a fresh pair. The role is always
/// re-read from the user record, never taken from old claims, so a role
/// change takes effect at the next refresh.
pub async fn refresh(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user_id = auth_service::refresh_token_user_id(&state.config.auth, &payload.refresh_token)?;

    let found = Users::find_by_id(user_id)
        .filter(UserCol::DeletedAt.is_null())
        .find_also_related(Roles)
        .one(&state.orm)
        .await?;

    let (user, role) = match found {
        Some((user, Some(role))) => (user, role),
        _ => return Err(AppError::Unauthorized("Unknown user".into())),
    };

    let resp = issue_and_store_tokens(state, user, role.kind).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(resp.user.id),
        AuditAction::TokenRefresh,
        Some("users"),
        Some(serde_json::json!({ "user_id": resp.user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Token refreshed",
        resp,
        Some(Meta::empty()),
    ))
}

async fn issue_and_store_tokens(
    state: &AppState,
    user: UserModel,
    role_kind: String,
) -> AppResult<AuthResponse> {
    let identity = TokenIdentity {
        user_id: user.id,
        role: role_kind.clone(),
        email: user.email.clone(),
        nickname: user.nickname.clone(),
    };
    let (access, refresh) = auth_service::issue_token_pair(&state.config.auth, &identity)?;

    let mut active: UserActive = user.into();
    active.access_token = Set(Some(access.clone()));
    active.refresh_token = Set(Some(refresh.clone()));
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    Ok(AuthResponse {
        user: user_from_entity(user, role_kind),
        token: access,
        refresh_token: refresh,
    })
}

pub async fn get_user(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user_id)
        .filter(UserCol::DeletedAt.is_null())
        .find_also_related(Roles)
        .one(&state.orm)
        .await?;

    match found {
        Some((user, Some(role))) => Ok(ApiResponse::success(
            "OK",
            user_from_entity(user, role.kind),
            Some(Meta::empty()),
        )),
        _ => Err(AppError::NotFound),
    }
}

pub async fn update_user(
    state: &AppState,
    caller: &AuthUser,
    user_id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user_id)
        .filter(UserCol::DeletedAt.is_null())
        .find_also_related(Roles)
        .one(&state.orm)
        .await?;

    let (user, role) = match found {
        Some((user, Some(role))) => (user, role),
        _ => return Err(AppError::NotFound),
    };

    if let Some(nickname) = payload.nickname.as_ref().filter(|n| **n != user.nickname) {
        let taken = Users::find()
            .filter(UserCol::Nickname.eq(nickname.as_str()))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("nickname already in use".into()));
        }
    }
    if let Some(email) = payload.email.as_ref().filter(|e| **e != user.email) {
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("email already in use".into()));
        }
    }

    let mut active: UserActive = user.into();
    if let Some(nickname) = payload.nickname {
        active.nickname = Set(nickname);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(caller.user_id),
        AuditAction::UserUpdate,
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User updated",
        user_from_entity(user, role.kind),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find()
        .filter(UserCol::DeletedAt.is_null())
        .order_by_desc(UserCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Roles)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(user, role)| {
            let kind = role.map(|r| r.kind).unwrap_or_default();
            user_from_entity(user, kind)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", UserList { items }, Some(meta)))
}

pub fn user_from_entity(model: UserModel, role_kind: String) -> User {
    User {
        id: model.id,
        nickname: model.nickname,
        email: model.email,
        role: role_kind,
        points: model.points,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
