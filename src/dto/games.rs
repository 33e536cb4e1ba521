use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Game;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub release_date: Option<NaiveDate>,
    pub developer_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub release_date: Option<NaiveDate>,
    pub developer_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct GameList {
    #[schema(value_type = Vec<Game>)]
    pub items: Vec<Game>,
}
