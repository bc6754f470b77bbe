// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::models::attempt::{Answer, QuizAttempt};
use crate::models::question::Question;
use crate::models::quiz::{Quiz, RecommendedQuiz};
use crate::models::stats::{PopularTopic, Rollup, TopicCount, UserStatistics};
use crate::models::topic::Topic;
use crate::models::user::User;
use crate::store::{
    AttemptHistoryRow, FavoriteCount, NewAnswer, NewAttempt, NewQuestion, NewQuiz, NewUser,
    QuizStore,
};

/// Postgres-backed store used in production. All queries go through the
/// runtime API so the crate builds without a reachable database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper row for quiz-with-topic joins; flattened because the topic columns
/// collide with the quiz columns otherwise.
#[derive(FromRow)]
struct RecommendedQuizRow {
    id: i64,
    topic_id: i64,
    title: String,
    description: Option<String>,
    difficulty: String,
    is_published: bool,
    topic_name: String,
    topic_description: Option<String>,
    topic_created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RecommendedQuizRow> for RecommendedQuiz {
    fn from(row: RecommendedQuizRow) -> Self {
        RecommendedQuiz {
            id: row.id,
            topic_id: row.topic_id,
            title: row.title,
            description: row.description,
            difficulty: row.difficulty,
            is_published: row.is_published,
            topic: Topic {
                id: row.topic_id,
                name: row.topic_name,
                description: row.topic_description,
                created_at: row.topic_created_at,
            },
        }
    }
}

/// Helper row for the favorite-count ranking.
#[derive(FromRow)]
struct FavoriteLeaderRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    favorites: i64,
}

const RECOMMENDED_BY_TOPIC_IDS: &str = r#"
    SELECT
        q.id, q.topic_id, q.title, q.description, q.difficulty, q.is_published,
        t.name AS topic_name,
        t.description AS topic_description,
        t.created_at AS topic_created_at
    FROM quizzes q
    JOIN topics t ON q.topic_id = t.id
    WHERE q.topic_id = ANY($1)
      AND NOT EXISTS (
          SELECT 1 FROM quiz_attempts qa
          WHERE qa.quiz_id = q.id AND qa.user_id = $2
      )
    ORDER BY q.id ASC
    LIMIT $3
"#;

const RECOMMENDED_BY_TOPIC_NAMES: &str = r#"
    SELECT
        q.id, q.topic_id, q.title, q.description, q.difficulty, q.is_published,
        t.name AS topic_name,
        t.description AS topic_description,
        t.created_at AS topic_created_at
    FROM quizzes q
    JOIN topics t ON q.topic_id = t.id
    WHERE t.name = ANY($1)
      AND NOT EXISTS (
          SELECT 1 FROM quiz_attempts qa
          WHERE qa.quiz_id = q.id AND qa.user_id = $2
      )
    ORDER BY q.id ASC
    LIMIT $3
"#;

#[async_trait]
impl QuizStore for PgStore {
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password, google_id, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password, google_id, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password, google_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password, google_id, created_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password)
        .bind(&new_user.google_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::BadRequest("User already exists".to_string());
                }
            }
            AppError::from(e)
        })?;
        Ok(user)
    }

    async fn link_google_id(&self, user_id: i64, google_id: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET google_id = $2
            WHERE id = $1
            RETURNING id, email, name, password, google_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(google_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users WHERE email = $1
            RETURNING id, email, name, password, google_id, created_at
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_topic(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Topic, AppError> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            INSERT INTO topics (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(topic)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, AppError> {
        let topics = sqlx::query_as::<_, Topic>(
            "SELECT id, name, description, created_at FROM topics ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn topic_by_id(&self, id: i64) -> Result<Option<Topic>, AppError> {
        let topic = sqlx::query_as::<_, Topic>(
            "SELECT id, name, description, created_at FROM topics WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(topic)
    }

    async fn count_topics(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<Quiz, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (topic_id, title, description, difficulty, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, topic_id, title, description, difficulty, is_published, created_at
            "#,
        )
        .bind(new_quiz.topic_id)
        .bind(&new_quiz.title)
        .bind(&new_quiz.description)
        .bind(&new_quiz.difficulty)
        .bind(new_quiz.is_published)
        .fetch_one(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (quiz_id, text, options, correct_answer, explanation, points, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, quiz_id, text, options, correct_answer, explanation, points, order_index
            "#,
        )
        .bind(new_question.quiz_id)
        .bind(&new_question.text)
        .bind(&new_question.options)
        .bind(&new_question.correct_answer)
        .bind(&new_question.explanation)
        .bind(new_question.points)
        .bind(new_question.order_index)
        .fetch_one(&self.pool)
        .await?;
        Ok(question)
    }

    async fn published_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, topic_id, title, description, difficulty, is_published, created_at
            FROM quizzes
            WHERE id = $1 AND is_published = TRUE
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn random_published_quiz(&self, topic_id: i64) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, topic_id, title, description, difficulty, is_published, created_at
            FROM quizzes
            WHERE topic_id = $1 AND is_published = TRUE
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, text, options, correct_answer, explanation, points, order_index
            FROM questions
            WHERE quiz_id = $1
            ORDER BY order_index ASC, id ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn question_by_id(&self, id: i64) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, text, options, correct_answer, explanation, points, order_index
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn create_attempt(&self, new_attempt: NewAttempt) -> Result<QuizAttempt, AppError> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, quiz_id, score, total_points, is_completed, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, quiz_id, score, total_points, is_completed, started_at, completed_at
            "#,
        )
        .bind(new_attempt.user_id)
        .bind(new_attempt.quiz_id)
        .bind(new_attempt.score)
        .bind(new_attempt.total_points)
        .bind(new_attempt.is_completed)
        .bind(new_attempt.completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn create_answer(&self, new_answer: NewAnswer) -> Result<Answer, AppError> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (attempt_id, question_id, user_answer, is_correct)
            VALUES ($1, $2, $3, $4)
            RETURNING id, attempt_id, question_id, user_answer, is_correct
            "#,
        )
        .bind(new_answer.attempt_id)
        .bind(new_answer.question_id)
        .bind(&new_answer.user_answer)
        .bind(new_answer.is_correct)
        .fetch_one(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, user_id, quiz_id, score, total_points, is_completed, started_at, completed_at
            FROM quiz_attempts
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn answers_for_user(&self, user_id: i64) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT a.id, a.attempt_id, a.question_id, a.user_answer, a.is_correct
            FROM answers a
            JOIN quiz_attempts qa ON a.attempt_id = qa.id
            WHERE qa.user_id = $1
            ORDER BY a.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn attempt_history(&self, user_id: i64) -> Result<Vec<AttemptHistoryRow>, AppError> {
        let rows = sqlx::query_as::<_, AttemptHistoryRow>(
            r#"
            SELECT qa.id, q.title, qa.score, qa.total_points, qa.started_at, qa.completed_at
            FROM quiz_attempts qa
            JOIN quizzes q ON qa.quiz_id = q.id
            WHERE qa.user_id = $1
            ORDER BY qa.started_at DESC, qa.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn favorite_topics(&self, user_id: i64) -> Result<Vec<Topic>, AppError> {
        let topics = sqlx::query_as::<_, Topic>(
            r#"
            SELECT t.id, t.name, t.description, t.created_at
            FROM user_favorites f
            JOIN topics t ON f.topic_id = t.id
            WHERE f.user_id = $1
            ORDER BY t.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn toggle_favorite(&self, user_id: i64, topic_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_favorites WHERE user_id = $1 AND topic_id = $2",
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_one(&mut *tx)
        .await?;

        let favorited = if existing > 0 {
            sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND topic_id = $2")
                .bind(user_id)
                .bind(topic_id)
                .execute(&mut *tx)
                .await?;
            false
        } else {
            sqlx::query("INSERT INTO user_favorites (user_id, topic_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(topic_id)
                .execute(&mut *tx)
                .await?;
            true
        };

        tx.commit().await?;
        Ok(favorited)
    }

    async fn topic_distribution(&self, user_id: i64) -> Result<Vec<TopicCount>, AppError> {
        let rows = sqlx::query_as::<_, TopicCount>(
            r#"
            SELECT t.id AS topic_id, t.name, COUNT(*) AS count
            FROM quiz_attempts qa
            JOIN quizzes q ON qa.quiz_id = q.id
            JOIN topics t ON q.topic_id = t.id
            WHERE qa.user_id = $1
            GROUP BY t.id, t.name
            ORDER BY count DESC, t.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn global_topic_attempts(&self, limit: i64) -> Result<Vec<PopularTopic>, AppError> {
        let rows = sqlx::query_as::<_, PopularTopic>(
            r#"
            SELECT
                t.id,
                t.name,
                COALESCE(t.description, '') AS description,
                COUNT(qa.id) AS attempt_count,
                COUNT(DISTINCT qa.user_id) AS unique_users
            FROM quiz_attempts qa
            JOIN quizzes q ON qa.quiz_id = q.id
            JOIN topics t ON q.topic_id = t.id
            GROUP BY t.id, t.name, t.description
            ORDER BY attempt_count DESC, t.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn favorite_leaders(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<FavoriteCount>, AppError> {
        let rows = sqlx::query_as::<_, FavoriteLeaderRow>(
            r#"
            SELECT t.id, t.name, t.description, t.created_at, COUNT(*) AS favorites
            FROM user_favorites f
            JOIN topics t ON f.topic_id = t.id
            WHERE t.id <> ALL($1)
            GROUP BY t.id, t.name, t.description, t.created_at
            ORDER BY favorites DESC, t.id ASC
            LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FavoriteCount {
                topic: Topic {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                    created_at: row.created_at,
                },
                favorites: row.favorites,
            })
            .collect())
    }

    async fn topics_excluding(&self, exclude: &[i64], limit: i64) -> Result<Vec<Topic>, AppError> {
        let topics = sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, name, description, created_at
            FROM topics
            WHERE id <> ALL($1)
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    async fn unattempted_quizzes_by_topic_ids(
        &self,
        user_id: i64,
        topic_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError> {
        let rows = sqlx::query_as::<_, RecommendedQuizRow>(RECOMMENDED_BY_TOPIC_IDS)
            .bind(topic_ids)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(RecommendedQuiz::from).collect())
    }

    async fn unattempted_quizzes_by_topic_names(
        &self,
        user_id: i64,
        names: &[String],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError> {
        let rows = sqlx::query_as::<_, RecommendedQuizRow>(RECOMMENDED_BY_TOPIC_NAMES)
            .bind(names)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(RecommendedQuiz::from).collect())
    }

    async fn upsert_statistics(
        &self,
        user_id: i64,
        rollup: &Rollup,
    ) -> Result<UserStatistics, AppError> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            INSERT INTO user_statistics
                (user_id, total_quizzes, completed_quizzes, correct_answers,
                 wrong_answers, average_accuracy, topics_attempted, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            ON CONFLICT (user_id) DO UPDATE SET
                total_quizzes = EXCLUDED.total_quizzes,
                completed_quizzes = EXCLUDED.completed_quizzes,
                correct_answers = EXCLUDED.correct_answers,
                wrong_answers = EXCLUDED.wrong_answers,
                average_accuracy = EXCLUDED.average_accuracy,
                topics_attempted = EXCLUDED.topics_attempted,
                last_updated = EXCLUDED.last_updated
            RETURNING user_id, total_quizzes, completed_quizzes, correct_answers,
                      wrong_answers, average_accuracy, topics_attempted, last_updated
            "#,
        )
        .bind(user_id)
        .bind(rollup.total_quizzes)
        .bind(rollup.completed_quizzes)
        .bind(rollup.correct_answers)
        .bind(rollup.wrong_answers)
        .bind(rollup.average_accuracy)
        .bind(rollup.topics_attempted)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn statistics_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<UserStatistics>, AppError> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT user_id, total_quizzes, completed_quizzes, correct_answers,
                   wrong_answers, average_accuracy, topics_attempted, last_updated
            FROM user_statistics
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats)
    }
}
