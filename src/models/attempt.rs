// src/models/attempt.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,

    /// Accumulated points; never exceeds `total_points`.
    pub score: i64,

    /// Sum of question points at attempt time.
    pub total_points: i64,

    pub is_completed: bool,

    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Null until the attempt completes.
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,

    /// The resolved option text the user picked, or the "Unknown" sentinel
    /// for an out-of-range selection.
    pub user_answer: String,

    /// Stored as a proper boolean. Historical exports also carried "true",
    /// "TRUE" or "1"; the deserializer folds those back into a bool.
    #[serde(deserialize_with = "normalize_correct_flag")]
    pub is_correct: bool,
}

/// Folds the correctness-flag shapes legacy writers produced into a bool:
/// boolean true, "true" in any casing, and 1 (string or number) all count as
/// correct. Anything else does not.
pub fn is_correct_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::String(text) => text.eq_ignore_ascii_case("true") || text == "1",
        serde_json::Value::Number(number) => number.as_i64() == Some(1),
        _ => false,
    }
}

fn normalize_correct_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(is_correct_value(&value))
}

/// DTO for recording a finished attempt. Required fields are `Option` so a
/// missing field reports a 400 with a useful message rather than a
/// deserialize reject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizResultRequest {
    pub user_id: Option<i64>,
    pub quiz_id: Option<i64>,
    pub score: Option<i64>,
    pub total_points: Option<i64>,

    /// Mapping of question id → selected option index.
    pub selected_answers: Option<serde_json::Value>,
}

/// DTO for the history and stats endpoints.
#[derive(Debug, Deserialize)]
pub struct UserLookupRequest {
    pub email: Option<String>,
}

/// One line of a user's quiz history, display-formatted.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub title: String,

    /// "score/totalPoints", e.g. "7/10".
    pub score: String,

    /// en-US long date, e.g. "March 5, 2026".
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_flags_pass_through() {
        assert!(is_correct_value(&json!(true)));
        assert!(!is_correct_value(&json!(false)));
    }

    #[test]
    fn legacy_string_flags_normalize() {
        assert!(is_correct_value(&json!("true")));
        assert!(is_correct_value(&json!("TRUE")));
        assert!(is_correct_value(&json!("True")));
        assert!(is_correct_value(&json!("1")));
        assert!(!is_correct_value(&json!("false")));
        assert!(!is_correct_value(&json!("yes")));
        assert!(!is_correct_value(&json!("0")));
    }

    #[test]
    fn numeric_flags_normalize() {
        assert!(is_correct_value(&json!(1)));
        assert!(!is_correct_value(&json!(0)));
        assert!(!is_correct_value(&json!(2)));
    }

    #[test]
    fn other_shapes_are_incorrect() {
        assert!(!is_correct_value(&json!(null)));
        assert!(!is_correct_value(&json!([true])));
        assert!(!is_correct_value(&json!({"value": true})));
    }

    #[test]
    fn answer_deserializes_legacy_flag() {
        let answer: Answer = serde_json::from_value(json!({
            "id": 1,
            "attemptId": 2,
            "questionId": 3,
            "userAnswer": "c",
            "isCorrect": "1"
        }))
        .unwrap();
        assert!(answer.is_correct);
    }
}
