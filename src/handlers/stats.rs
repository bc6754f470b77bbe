// src/handlers/stats.rs

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    config::POPULAR_TOPIC_LIMIT,
    error::AppError,
    models::{
        attempt::{HistoryEntry, UserLookupRequest},
        stats::StatsView,
    },
    stats::{aggregate::compute_rollup, popular, recommend::recommended_quizzes},
    store::DynStore,
};

/// Computes, persists and serves the user's statistics bundle.
///
/// The rollup is recomputed from the raw attempt data on every call and
/// upserted, so the stored row never drifts from the source of truth. An
/// unknown email is an expected case (clients probe before an account
/// exists) and reports 200 with a message rather than an error.
pub async fn user_stats(
    State(store): State<DynStore>,
    Json(payload): Json<UserLookupRequest>,
) -> Result<Response, AppError> {
    let Some(email) = payload.email.as_deref() else {
        return Err(AppError::BadRequest("Email is required".to_string()));
    };

    let Some(user) = store.user_by_email(email).await? else {
        return Ok(Json(json!({ "message": "User does not exist" })).into_response());
    };

    let attempts = store.attempts_for_user(user.id).await?;
    let answers = store.answers_for_user(user.id).await?;
    let distribution = store.topic_distribution(user.id).await?;

    let rollup = compute_rollup(&attempts, &answers, distribution.len() as i64);
    let performance = store.upsert_statistics(user.id, &rollup).await?;

    let favorites = store.favorite_topics(user.id).await?;
    let popular_topics: Vec<_> = distribution
        .iter()
        .take(POPULAR_TOPIC_LIMIT as usize)
        .cloned()
        .collect();

    let recommended = recommended_quizzes(
        store.as_ref(),
        user.id,
        &favorites,
        &distribution,
        &popular_topics,
    )
    .await?;

    Ok(Json(StatsView {
        performance,
        topic_distribution: distribution,
        popular_topics,
        favorite_topics: favorites,
        recommended_quizzes: recommended,
    })
    .into_response())
}

/// Serves the user's attempt history, newest first, display-formatted.
pub async fn quiz_history(
    State(store): State<DynStore>,
    Json(payload): Json<UserLookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(email) = payload.email.as_deref() else {
        return Err(AppError::BadRequest("Email is required".to_string()));
    };

    let user = store
        .user_by_email(email)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    let rows = store.attempt_history(user.id).await?;

    let quiz_history: Vec<HistoryEntry> = rows
        .into_iter()
        .map(|row| HistoryEntry {
            id: row.id,
            title: row.title,
            score: format!("{}/{}", row.score, row.total_points),
            date: format_history_date(row.completed_at.unwrap_or(row.started_at)),
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "quizHistory": quiz_history
    })))
}

/// Site-wide topic popularity for discovery pages.
pub async fn popular_topics(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let topics = popular::popular_topics(store.as_ref()).await?;

    Ok(Json(json!({
        "success": true,
        "popularTopics": topics
    })))
}

/// en-US long date, e.g. "March 5, 2026".
fn format_history_date(when: chrono::DateTime<chrono::Utc>) -> String {
    when.format("%B %-d, %Y").to_string()
}
