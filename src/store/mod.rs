// src/store/mod.rs

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::attempt::{Answer, QuizAttempt};
use crate::models::question::Question;
use crate::models::quiz::{Quiz, RecommendedQuiz};
use crate::models::stats::{PopularTopic, Rollup, TopicCount, UserStatistics};
use crate::models::topic::Topic;
use crate::models::user::User;

/// Shared handle to the active store implementation.
pub type DynStore = Arc<dyn QuizStore>;

/// New-user payload. `password` already holds the argon2 hash; it is `None`
/// for accounts created through Google auth.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password: Option<String>,
    pub google_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub topic_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub is_published: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_id: i64,
    pub text: String,
    pub options: serde_json::Value,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub points: i64,
    pub order_index: i64,
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_points: i64,
    pub is_completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub attempt_id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
}

/// One attempt joined with its quiz title, for history listings.
#[derive(Debug, Clone, FromRow)]
pub struct AttemptHistoryRow {
    pub id: i64,
    pub title: String,
    pub score: i64,
    pub total_points: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A topic with its favorite count, for popularity padding.
#[derive(Debug, Clone)]
pub struct FavoriteCount {
    pub topic: Topic,
    pub favorites: i64,
}

/// Repository interface every storage backend implements. Handlers receive
/// it as [`DynStore`], so swapping Postgres for the in-memory implementation
/// is a matter of construction, not of handler code.
///
/// Ordering rules are part of the contract: every count-ordered listing
/// breaks ties by topic id ascending, questions order by `order_index` then
/// id, and history orders newest first.
#[async_trait]
pub trait QuizStore: Send + Sync {
    // Users
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Fails with a 400 "User already exists" on a duplicate email.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn link_google_id(&self, user_id: i64, google_id: &str) -> Result<User, AppError>;
    /// Removes the user and, through cascade, their attempts, answers,
    /// statistics and favorites. Returns the removed row.
    async fn delete_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    // Content
    async fn create_topic(&self, name: &str, description: Option<&str>)
    -> Result<Topic, AppError>;
    async fn list_topics(&self) -> Result<Vec<Topic>, AppError>;
    async fn topic_by_id(&self, id: i64) -> Result<Option<Topic>, AppError>;
    async fn count_topics(&self) -> Result<i64, AppError>;
    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<Quiz, AppError>;
    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError>;
    /// Fetch by id, restricted to published quizzes.
    async fn published_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError>;
    /// One published quiz of the topic, chosen uniformly at random.
    async fn random_published_quiz(&self, topic_id: i64) -> Result<Option<Quiz>, AppError>;
    async fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<Question>, AppError>;
    async fn question_by_id(&self, id: i64) -> Result<Option<Question>, AppError>;

    // Attempts
    async fn create_attempt(&self, new_attempt: NewAttempt) -> Result<QuizAttempt, AppError>;
    async fn create_answer(&self, new_answer: NewAnswer) -> Result<Answer, AppError>;
    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError>;
    /// Every answer across all of the user's attempts.
    async fn answers_for_user(&self, user_id: i64) -> Result<Vec<Answer>, AppError>;
    async fn attempt_history(&self, user_id: i64) -> Result<Vec<AttemptHistoryRow>, AppError>;

    // Favorites
    async fn favorite_topics(&self, user_id: i64) -> Result<Vec<Topic>, AppError>;
    /// Flips the favorite relation and returns the new state.
    async fn toggle_favorite(&self, user_id: i64, topic_id: i64) -> Result<bool, AppError>;

    // Aggregation (groupBy + count + sort + limit lives behind this seam)
    /// Per-topic attempt counts for one user, count descending.
    async fn topic_distribution(&self, user_id: i64) -> Result<Vec<TopicCount>, AppError>;
    /// Site-wide attempt counts with distinct attempting users, per topic.
    async fn global_topic_attempts(&self, limit: i64) -> Result<Vec<PopularTopic>, AppError>;
    /// Topics ranked by favorite count, excluding the given ids.
    async fn favorite_leaders(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<FavoriteCount>, AppError>;
    /// Arbitrary remaining topics (id ascending), excluding the given ids.
    async fn topics_excluding(&self, exclude: &[i64], limit: i64) -> Result<Vec<Topic>, AppError>;
    /// Quizzes in the given topics that the user has not attempted yet.
    async fn unattempted_quizzes_by_topic_ids(
        &self,
        user_id: i64,
        topic_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError>;
    /// Same, selecting topics by name instead of id.
    async fn unattempted_quizzes_by_topic_names(
        &self,
        user_id: i64,
        names: &[String],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError>;

    // Rollup
    async fn upsert_statistics(
        &self,
        user_id: i64,
        rollup: &Rollup,
    ) -> Result<UserStatistics, AppError>;
    async fn statistics_for_user(&self, user_id: i64)
    -> Result<Option<UserStatistics>, AppError>;
}
