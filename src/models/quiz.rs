// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::topic::Topic;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,

    pub topic_id: i64,

    pub title: String,

    pub description: Option<String>,

    /// 'EASY', 'MEDIUM' or 'HARD'.
    pub difficulty: String,

    /// Only published quizzes are servable to clients.
    pub is_published: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for the quiz fetch endpoint. At least one identifier must be
/// supplied; `quizId` wins when both are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuizRequest {
    pub topic_id: Option<i64>,
    pub quiz_id: Option<i64>,
}

/// One playable question as served to clients.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    /// Always "multiple"; every stored question is multiple choice.
    #[serde(rename = "type")]
    pub question_type: String,
    /// The owning topic's name.
    pub category: String,
    #[serde(rename = "questionId")]
    pub question_id: i64,
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

/// Quiz fetch response: the topic name plus the playable questions in
/// display order.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub topic: String,
    pub questions: Vec<QuestionView>,
}

/// A quiz joined with its topic, as emitted by the recommendation tiers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedQuiz {
    pub id: i64,
    pub topic_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub is_published: bool,
    pub topic: Topic,
}

/// DTO for quiz generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    pub topic: Option<String>,
    pub num_questions: Option<u32>,
}
