use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    entity::{
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    services::game_service,
    state::AppState,
};

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    Ok(())
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    validate_rating(payload.rating)?;

    game_service::find_game(&state.orm, payload.game_id).await?;

    let author = Users::find_by_id(user.user_id)
        .filter(UserCol::DeletedAt.is_null())
        .one(&state.orm)
        .await?;
    if author.is_none() {
        return Err(AppError::BadRequest("user not found".into()));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        game_id: Set(payload.game_id),
        user_id: Set(user.user_id),
        title: Set(payload.title),
        description: Set(payload.description),
        rating: Set(payload.rating),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::ReviewCreate,
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "game_id": review.game_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        None,
    ))
}

pub async fn get_review(state: &AppState, review_id: Uuid) -> AppResult<ApiResponse<Review>> {
    let review = find_live_review(state, review_id).await?;
    Ok(ApiResponse::success(
        "OK",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn list_reviews_by_game(
    state: &AppState,
    game_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let items = Reviews::find()
        .filter(ReviewCol::GameId.eq(game_id))
        .filter(ReviewCol::DeletedAt.is_null())
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        ReviewList { items },
        Some(Meta::empty()),
    ))
}

/// Reviews are author-only: the ownership check runs against the review
/// row and admins get no bypass here.
pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    review_id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let review = find_live_review(state, review_id).await?;

    if review.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }

    let mut active: ReviewActive = review.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::ReviewUpdate,
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review updated",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    review_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let review = find_live_review(state, review_id).await?;

    if review.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let mut active: ReviewActive = review.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        AuditAction::ReviewDelete,
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Review deleted"))
}

async fn find_live_review(state: &AppState, review_id: Uuid) -> AppResult<ReviewModel> {
    let review = Reviews::find_by_id(review_id)
        .filter(ReviewCol::DeletedAt.is_null())
        .one(&state.orm)
        .await?;
    review.ok_or(AppError::NotFound)
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        game_id: model.game_id,
        user_id: model.user_id,
        title: model.title,
        description: model.description,
        rating: model.rating,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
