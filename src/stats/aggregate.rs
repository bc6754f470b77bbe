// src/stats/aggregate.rs

use crate::models::attempt::{Answer, QuizAttempt};
use crate::models::stats::Rollup;

/// Recomputes the per-user rollup from the full attempt history.
///
/// Correctness comes from the stored `is_correct` flags (normalized at the
/// read boundary), never from re-deriving answer text: option ordering may
/// have changed since the attempt was recorded. Accuracy is a ratio in
/// [0, 1] and is 0 when the user has no graded answers.
pub fn compute_rollup(
    attempts: &[QuizAttempt],
    answers: &[Answer],
    topics_attempted: i64,
) -> Rollup {
    let total_quizzes = attempts.len() as i64;
    let completed_quizzes = attempts.iter().filter(|a| a.is_completed).count() as i64;

    let correct_answers = answers.iter().filter(|a| a.is_correct).count() as i64;
    let wrong_answers = answers.len() as i64 - correct_answers;

    let graded = correct_answers + wrong_answers;
    let average_accuracy = if graded == 0 {
        0.0
    } else {
        correct_answers as f64 / graded as f64
    };

    Rollup {
        total_quizzes,
        completed_quizzes,
        correct_answers,
        wrong_answers,
        average_accuracy,
        topics_attempted,
    }
}
