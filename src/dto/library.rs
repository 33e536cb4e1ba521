use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Game;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LibraryGameList {
    #[schema(value_type = Vec<Game>)]
    pub items: Vec<Game>,
}
