//! Genre endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::genre::Genre, AppState};

/// List all genres by name
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}
