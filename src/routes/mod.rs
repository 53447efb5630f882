pub mod admin;
pub mod catalog;
pub mod ratings;
pub mod reviews;
pub mod users;

use crate::{
    AppState,
    entities::movie,
    error::{AppError, AppResult},
};

/// Numeric ids in paths; anything unparsable is treated as a missing record.
fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse().map_err(|_| AppError::NotFound)
}

async fn movie_by_id(state: &AppState, raw: &str) -> AppResult<movie::Model> {
    let id = parse_id(raw)?;
    state.store.find_by(movie::Column::Id, id).await?.ok_or(AppError::NotFound)
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
