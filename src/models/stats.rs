// src/models/stats.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::quiz::RecommendedQuiz;
use crate::models::topic::Topic;

/// Represents the 'user_statistics' table: the per-user derived rollup.
/// Entirely derived from attempts and answers, so it is safe to delete and
/// recompute at any time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub user_id: i64,
    pub total_quizzes: i64,
    pub completed_quizzes: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,

    /// Ratio in [0, 1]; 0 when the user has no graded answers.
    pub average_accuracy: f64,

    /// Distinct topics among the user's attempted quizzes.
    pub topics_attempted: i64,

    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Derived rollup values before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub total_quizzes: i64,
    pub completed_quizzes: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    pub average_accuracy: f64,
    pub topics_attempted: i64,
}

/// One row of a user's per-topic attempt distribution, ordered by count
/// descending with topic id ascending breaking ties.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopicCount {
    /// Kept for the recommendation tiers; the wire format carries only the
    /// topic name and count.
    #[serde(skip_serializing)]
    pub topic_id: i64,
    pub name: String,
    pub count: i64,
}

/// One entry of the site-wide popular-topics ranking. Padded entries (topics
/// without attempts) report an `attempt_count` of 0 and reuse `unique_users`
/// for their favorite count.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTopic {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub attempt_count: i64,
    pub unique_users: i64,
}

/// Stats bundle returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub performance: UserStatistics,
    pub topic_distribution: Vec<TopicCount>,
    pub popular_topics: Vec<TopicCount>,
    pub favorite_topics: Vec<Topic>,
    pub recommended_quizzes: Vec<RecommendedQuiz>,
}
