// src/stats/recommend.rs

use crate::config::RECOMMENDATION_LIMIT;
use crate::error::AppError;
use crate::models::quiz::RecommendedQuiz;
use crate::models::stats::TopicCount;
use crate::models::topic::Topic;
use crate::store::QuizStore;

/// The fallback order of the recommendation chain. A later tier is consulted
/// only when every earlier tier produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationTier {
    /// Quizzes in the user's favorited topics.
    FavoriteTopics,
    /// Quizzes in topics the user has already attempted.
    AttemptedTopics,
    /// Quizzes in the user's most-attempted (per-user popular) topics.
    PopularTopics,
}

pub const TIER_ORDER: [RecommendationTier; 3] = [
    RecommendationTier::FavoriteTopics,
    RecommendationTier::AttemptedTopics,
    RecommendationTier::PopularTopics,
];

/// Runs the recommendation chain: each tier is a same-shaped query over a
/// different topic set, tried in [`TIER_ORDER`], short-circuiting on the
/// first non-empty result. Every tier excludes quizzes the user has already
/// attempted and caps at 5. An empty result from every tier is valid.
pub async fn recommended_quizzes(
    store: &dyn QuizStore,
    user_id: i64,
    favorites: &[Topic],
    distribution: &[TopicCount],
    popular: &[TopicCount],
) -> Result<Vec<RecommendedQuiz>, AppError> {
    for tier in TIER_ORDER {
        let candidates =
            fetch_tier(store, user_id, tier, favorites, distribution, popular).await?;
        if !candidates.is_empty() {
            return Ok(candidates);
        }
    }
    Ok(Vec::new())
}

async fn fetch_tier(
    store: &dyn QuizStore,
    user_id: i64,
    tier: RecommendationTier,
    favorites: &[Topic],
    distribution: &[TopicCount],
    popular: &[TopicCount],
) -> Result<Vec<RecommendedQuiz>, AppError> {
    match tier {
        RecommendationTier::FavoriteTopics => {
            let topic_ids: Vec<i64> = favorites.iter().map(|t| t.id).collect();
            if topic_ids.is_empty() {
                return Ok(Vec::new());
            }
            store
                .unattempted_quizzes_by_topic_ids(user_id, &topic_ids, RECOMMENDATION_LIMIT)
                .await
        }
        RecommendationTier::AttemptedTopics => {
            let names: Vec<String> = distribution.iter().map(|d| d.name.clone()).collect();
            if names.is_empty() {
                return Ok(Vec::new());
            }
            store
                .unattempted_quizzes_by_topic_names(user_id, &names, RECOMMENDATION_LIMIT)
                .await
        }
        RecommendationTier::PopularTopics => {
            let topic_ids: Vec<i64> = popular.iter().map(|d| d.topic_id).collect();
            if topic_ids.is_empty() {
                return Ok(Vec::new());
            }
            store
                .unattempted_quizzes_by_topic_ids(user_id, &topic_ids, RECOMMENDATION_LIMIT)
                .await
        }
    }
}
