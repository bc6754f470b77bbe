// src/handlers/quiz.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    config::{DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT},
    error::AppError,
    models::{
        attempt::SaveQuizResultRequest,
        question::Question,
        quiz::{FetchQuizRequest, GenerateQuizRequest, QuestionView, QuizView},
    },
    services::quizgen::QuizGenerator,
    store::{DynStore, NewAnswer, NewAttempt},
};

/// Sentinel stored when a selected index does not land on an option. Grades
/// as incorrect against any real answer text.
const UNKNOWN_ANSWER: &str = "Unknown";

/// Generates a fresh multiple-choice quiz through the configured model.
///
/// The question count defaults to 5 and is clamped; an unparseable model
/// reply yields an empty question list rather than an error.
pub async fn generate_quiz(
    State(generator): State<QuizGenerator>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(topic) = payload
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
    else {
        return Err(AppError::BadRequest("Topic is required".to_string()));
    };

    let count = payload
        .num_questions
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT);

    let questions = generator.generate(topic, count).await?;

    Ok(Json(json!({
        "topic": topic,
        "questions": questions
    })))
}

/// Serves one playable quiz.
///
/// `quizId` fetches that quiz directly; `topicId` picks one of the topic's
/// published quizzes uniformly at random. Only published quizzes are served
/// either way.
pub async fn fetch_quiz(
    State(store): State<DynStore>,
    Json(payload): Json<FetchQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = if let Some(quiz_id) = payload.quiz_id {
        store
            .published_quiz(quiz_id)
            .await?
            .ok_or(AppError::NotFound("Quiz not found".to_string()))?
    } else if let Some(topic_id) = payload.topic_id {
        if store.topic_by_id(topic_id).await?.is_none() {
            return Err(AppError::NotFound("Topic not found".to_string()));
        }
        store.random_published_quiz(topic_id).await?.ok_or(
            AppError::NotFound("No quizzes found for this topic".to_string()),
        )?
    } else {
        return Err(AppError::BadRequest(
            "Topic ID or quiz ID is required".to_string(),
        ));
    };

    let topic = store
        .topic_by_id(quiz.topic_id)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let questions = store.questions_for_quiz(quiz.id).await?;

    let views: Vec<QuestionView> = questions
        .iter()
        .map(|question| QuestionView {
            question_type: "multiple".to_string(),
            category: topic.name.clone(),
            question_id: question.id,
            question: question.text.clone(),
            correct_answer: question.correct_answer.clone(),
            options: question.decoded_options(),
        })
        .collect();

    Ok(Json(QuizView {
        topic: topic.name,
        questions: views,
    }))
}

/// Records a finished attempt and grades each submitted answer.
///
/// `selectedAnswers` maps question ids to option indexes. Pairs are graded
/// in ascending question-id order; a pair whose question no longer exists is
/// skipped without aborting the rest. Statistics are not touched here (the
/// stats endpoint recomputes them on demand).
pub async fn save_quiz_result(
    State(store): State<DynStore>,
    Json(payload): Json<SaveQuizResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(user_id), Some(quiz_id), Some(score), Some(total_points), Some(selected)) = (
        payload.user_id,
        payload.quiz_id,
        payload.score,
        payload.total_points,
        payload.selected_answers.as_ref(),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields. Please provide userId, quizId, score, totalPoints, and selectedAnswers."
                .to_string(),
        ));
    };

    let Some(selected) = selected.as_object() else {
        return Err(AppError::BadRequest(
            "selectedAnswers must be an object mapping question ids to option indexes.".to_string(),
        ));
    };

    if score > total_points {
        return Err(AppError::BadRequest(
            "Score cannot exceed total points".to_string(),
        ));
    }

    if store.user_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let attempt = store
        .create_attempt(NewAttempt {
            user_id,
            quiz_id,
            score,
            total_points,
            is_completed: true,
            completed_at: Some(chrono::Utc::now()),
        })
        .await?;

    // Grade in ascending question-id order so reruns store answers
    // identically.
    let mut pairs: Vec<(i64, &serde_json::Value)> = Vec::with_capacity(selected.len());
    for (key, value) in selected {
        match key.parse::<i64>() {
            Ok(question_id) => pairs.push((question_id, value)),
            Err(_) => {
                tracing::warn!("Skipping answer with non-numeric question id '{}'", key);
            }
        }
    }
    pairs.sort_by_key(|(question_id, _)| *question_id);

    let mut answers = Vec::with_capacity(pairs.len());
    for (question_id, value) in pairs {
        let Some(question) = store.question_by_id(question_id).await? else {
            tracing::warn!("Skipping answer for unknown question {}", question_id);
            continue;
        };

        let user_answer = resolve_answer(&question, value);
        let is_correct = user_answer == question.correct_answer;

        let answer = store
            .create_answer(NewAnswer {
                attempt_id: attempt.id,
                question_id: question.id,
                user_answer,
                is_correct,
            })
            .await?;

        answers.push(answer);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz result saved successfully",
            "attempt": attempt,
            "answers": answers
        })),
    ))
}

/// Resolves a selected option index onto the question's option text.
///
/// The index may arrive as a JSON number or a numeric string. Anything that
/// does not land on an option (out of range, negative, non-numeric, or a
/// question whose options fail to decode) resolves to [`UNKNOWN_ANSWER`].
fn resolve_answer(question: &Question, selected: &serde_json::Value) -> String {
    let index = match selected {
        serde_json::Value::Number(number) => number.as_u64(),
        serde_json::Value::String(text) => text.parse::<u64>().ok(),
        _ => None,
    };

    let options = question.decoded_options();

    index
        .and_then(|i| options.get(i as usize).cloned())
        .unwrap_or_else(|| UNKNOWN_ANSWER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(options: serde_json::Value, correct_answer: &str) -> Question {
        Question {
            id: 1,
            quiz_id: 1,
            text: "Which option is correct?".to_string(),
            options,
            correct_answer: correct_answer.to_string(),
            explanation: None,
            points: 10,
            order_index: 0,
        }
    }

    #[test]
    fn in_range_index_resolves_to_option_text() {
        let q = question(json!(["a", "b", "c", "d"]), "c");

        let resolved = resolve_answer(&q, &json!(2));

        assert_eq!(resolved, "c");
        assert_eq!(resolved, q.correct_answer);
    }

    #[test]
    fn numeric_string_index_resolves() {
        let q = question(json!(["a", "b", "c", "d"]), "c");

        assert_eq!(resolve_answer(&q, &json!("2")), "c");
    }

    #[test]
    fn out_of_range_index_resolves_to_unknown() {
        let q = question(json!(["a", "b", "c", "d"]), "c");

        let resolved = resolve_answer(&q, &json!(99));

        assert_eq!(resolved, UNKNOWN_ANSWER);
        assert_ne!(resolved, q.correct_answer);
    }

    #[test]
    fn negative_and_non_numeric_indexes_resolve_to_unknown() {
        let q = question(json!(["a", "b"]), "a");

        assert_eq!(resolve_answer(&q, &json!(-1)), UNKNOWN_ANSWER);
        assert_eq!(resolve_answer(&q, &json!("first")), UNKNOWN_ANSWER);
        assert_eq!(resolve_answer(&q, &json!(null)), UNKNOWN_ANSWER);
        assert_eq!(resolve_answer(&q, &json!([0])), UNKNOWN_ANSWER);
    }

    #[test]
    fn legacy_serialized_options_resolve() {
        let q = question(json!("[\"Paris\",\"London\"]"), "Paris");

        assert_eq!(resolve_answer(&q, &json!(0)), "Paris");
    }

    #[test]
    fn undecodable_options_resolve_to_unknown() {
        let q = question(json!({"not": "a list"}), "a");

        assert_eq!(resolve_answer(&q, &json!(0)), UNKNOWN_ANSWER);
    }
}
