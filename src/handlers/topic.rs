// src/handlers/topic.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError, models::topic::FavoriteRequest, store::DynStore, utils::jwt::Claims,
};

/// Lists every topic, id ascending.
pub async fn list_topics(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let topics = store.list_topics().await?;

    Ok(Json(topics))
}

/// Toggles the authenticated user's favorite for a topic and returns the
/// new state. Favorites feed the stats recommendations.
pub async fn toggle_favorite(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(topic_id) = payload.topic_id else {
        return Err(AppError::BadRequest("Topic ID is required".to_string()));
    };

    if store.topic_by_id(topic_id).await?.is_none() {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

    let favorited = store.toggle_favorite(user_id, topic_id).await?;

    Ok(Json(json!({ "favorited": favorited })))
}
