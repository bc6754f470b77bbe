// src/store/memory.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IndexedRandom;

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

/// In-memory store backing the test suite and offline development.
///
/// Mirrors the Postgres implementation's observable behavior: the same
/// ordering and tie-break rules, cascade on user deletion, and the duplicate
/// email error. Rows are append-only vectors, so insertion order equals id
/// order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    topics: Vec<Topic>,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    attempts: Vec<QuizAttempt>,
    answers: Vec<Answer>,
    statistics: Vec<UserStatistics>,
    favorites: Vec<(i64, i64)>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::InternalServerError("store mutex poisoned".to_string()))
    }
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn topic_of_quiz(&self, quiz_id: i64) -> Option<&Topic> {
        let quiz = self.quizzes.iter().find(|q| q.id == quiz_id)?;
        self.topics.iter().find(|t| t.id == quiz.topic_id)
    }

    fn attempted_quiz_ids(&self, user_id: i64) -> HashSet<i64> {
        self.attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.quiz_id)
            .collect()
    }

    /// Quizzes the user has not attempted, filtered by a topic predicate,
    /// in quiz-id order.
    fn unattempted_quizzes<F>(&self, user_id: i64, limit: i64, keep: F) -> Vec<RecommendedQuiz>
    where
        F: Fn(&Topic) -> bool,
    {
        let attempted = self.attempted_quiz_ids(user_id);
        self.quizzes
            .iter()
            .filter(|quiz| !attempted.contains(&quiz.id))
            .filter_map(|quiz| {
                let topic = self.topics.iter().find(|t| t.id == quiz.topic_id)?;
                keep(topic).then(|| RecommendedQuiz {
                    id: quiz.id,
                    topic_id: quiz.topic_id,
                    title: quiz.title.clone(),
                    description: quiz.description.clone(),
                    difficulty: quiz.difficulty.clone(),
                    is_published: quiz.is_published,
                    topic: topic.clone(),
                })
            })
            .take(limit as usize)
            .collect()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }
        let user = User {
            id: inner.next_id(),
            email: new_user.email,
            name: new_user.name,
            password: new_user.password,
            google_id: new_user.google_id,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn link_google_id(&self, user_id: i64, google_id: &str) -> Result<User, AppError> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::InternalServerError("no such user".to_string()))?;
        user.google_id = Some(google_id.to_string());
        Ok(user.clone())
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut inner = self.lock()?;
        let Some(position) = inner.users.iter().position(|u| u.email == email) else {
            return Ok(None);
        };
        let user = inner.users.remove(position);

        // Cascade, as the foreign keys do in Postgres.
        let attempt_ids: HashSet<i64> = inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user.id)
            .map(|a| a.id)
            .collect();
        inner.answers.retain(|a| !attempt_ids.contains(&a.attempt_id));
        inner.attempts.retain(|a| a.user_id != user.id);
        inner.statistics.retain(|s| s.user_id != user.id);
        inner.favorites.retain(|(uid, _)| *uid != user.id);

        Ok(Some(user))
    }

    async fn create_topic(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Topic, AppError> {
        let mut inner = self.lock()?;
        let topic = Topic {
            id: inner.next_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        inner.topics.push(topic.clone());
        Ok(topic)
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, AppError> {
        let inner = self.lock()?;
        let mut topics = inner.topics.clone();
        topics.sort_by_key(|t| t.id);
        Ok(topics)
    }

    async fn topic_by_id(&self, id: i64) -> Result<Option<Topic>, AppError> {
        let inner = self.lock()?;
        Ok(inner.topics.iter().find(|t| t.id == id).cloned())
    }

    async fn count_topics(&self) -> Result<i64, AppError> {
        let inner = self.lock()?;
        Ok(inner.topics.len() as i64)
    }

    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<Quiz, AppError> {
        let mut inner = self.lock()?;
        let quiz = Quiz {
            id: inner.next_id(),
            topic_id: new_quiz.topic_id,
            title: new_quiz.title,
            description: new_quiz.description,
            difficulty: new_quiz.difficulty,
            is_published: new_quiz.is_published,
            created_at: Utc::now(),
        };
        inner.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError> {
        let mut inner = self.lock()?;
        let question = Question {
            id: inner.next_id(),
            quiz_id: new_question.quiz_id,
            text: new_question.text,
            options: new_question.options,
            correct_answer: new_question.correct_answer,
            explanation: new_question.explanation,
            points: new_question.points,
            order_index: new_question.order_index,
        };
        inner.questions.push(question.clone());
        Ok(question)
    }

    async fn published_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id && q.is_published)
            .cloned())
    }

    async fn random_published_quiz(&self, topic_id: i64) -> Result<Option<Quiz>, AppError> {
        let inner = self.lock()?;
        let matches: Vec<&Quiz> = inner
            .quizzes
            .iter()
            .filter(|q| q.topic_id == topic_id && q.is_published)
            .collect();
        Ok(matches.choose(&mut rand::rng()).map(|q| (*q).clone()))
    }

    async fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<Question>, AppError> {
        let inner = self.lock()?;
        let mut questions: Vec<Question> = inner
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.order_index, q.id));
        Ok(questions)
    }

    async fn question_by_id(&self, id: i64) -> Result<Option<Question>, AppError> {
        let inner = self.lock()?;
        Ok(inner.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn create_attempt(&self, new_attempt: NewAttempt) -> Result<QuizAttempt, AppError> {
        let mut inner = self.lock()?;
        let attempt = QuizAttempt {
            id: inner.next_id(),
            user_id: new_attempt.user_id,
            quiz_id: new_attempt.quiz_id,
            score: new_attempt.score,
            total_points: new_attempt.total_points,
            is_completed: new_attempt.is_completed,
            started_at: Utc::now(),
            completed_at: new_attempt.completed_at,
        };
        inner.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn create_answer(&self, new_answer: NewAnswer) -> Result<Answer, AppError> {
        let mut inner = self.lock()?;
        let answer = Answer {
            id: inner.next_id(),
            attempt_id: new_answer.attempt_id,
            question_id: new_answer.question_id,
            user_answer: new_answer.user_answer,
            is_correct: new_answer.is_correct,
        };
        inner.answers.push(answer.clone());
        Ok(answer)
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn answers_for_user(&self, user_id: i64) -> Result<Vec<Answer>, AppError> {
        let inner = self.lock()?;
        let attempt_ids: HashSet<i64> = inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id)
            .collect();
        Ok(inner
            .answers
            .iter()
            .filter(|a| attempt_ids.contains(&a.attempt_id))
            .cloned()
            .collect())
    }

    async fn attempt_history(&self, user_id: i64) -> Result<Vec<AttemptHistoryRow>, AppError> {
        let inner = self.lock()?;
        let mut rows: Vec<AttemptHistoryRow> = inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let quiz = inner.quizzes.iter().find(|q| q.id == a.quiz_id)?;
                Some(AttemptHistoryRow {
                    id: a.id,
                    title: quiz.title.clone(),
                    score: a.score,
                    total_points: a.total_points,
                    started_at: a.started_at,
                    completed_at: a.completed_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn favorite_topics(&self, user_id: i64) -> Result<Vec<Topic>, AppError> {
        let inner = self.lock()?;
        let mut topics: Vec<Topic> = inner
            .favorites
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, tid)| inner.topics.iter().find(|t| t.id == *tid).cloned())
            .collect();
        topics.sort_by_key(|t| t.id);
        Ok(topics)
    }

    async fn toggle_favorite(&self, user_id: i64, topic_id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        if let Some(position) = inner
            .favorites
            .iter()
            .position(|&(uid, tid)| uid == user_id && tid == topic_id)
        {
            inner.favorites.remove(position);
            Ok(false)
        } else {
            inner.favorites.push((user_id, topic_id));
            Ok(true)
        }
    }

    async fn topic_distribution(&self, user_id: i64) -> Result<Vec<TopicCount>, AppError> {
        let inner = self.lock()?;
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for attempt in inner.attempts.iter().filter(|a| a.user_id == user_id) {
            if let Some(topic) = inner.topic_of_quiz(attempt.quiz_id) {
                *counts.entry(topic.id).or_insert(0) += 1;
            }
        }
        let mut rows: Vec<TopicCount> = counts
            .into_iter()
            .filter_map(|(topic_id, count)| {
                let topic = inner.topics.iter().find(|t| t.id == topic_id)?;
                Some(TopicCount {
                    topic_id,
                    name: topic.name.clone(),
                    count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.topic_id.cmp(&b.topic_id)));
        Ok(rows)
    }

    async fn global_topic_attempts(&self, limit: i64) -> Result<Vec<PopularTopic>, AppError> {
        let inner = self.lock()?;
        let mut per_topic: BTreeMap<i64, (i64, HashSet<i64>)> = BTreeMap::new();
        for attempt in &inner.attempts {
            if let Some(topic) = inner.topic_of_quiz(attempt.quiz_id) {
                let entry = per_topic.entry(topic.id).or_default();
                entry.0 += 1;
                entry.1.insert(attempt.user_id);
            }
        }
        let mut rows: Vec<PopularTopic> = per_topic
            .into_iter()
            .filter_map(|(topic_id, (attempt_count, users))| {
                let topic = inner.topics.iter().find(|t| t.id == topic_id)?;
                Some(PopularTopic {
                    id: topic_id,
                    name: topic.name.clone(),
                    description: topic.description.clone().unwrap_or_default(),
                    attempt_count,
                    unique_users: users.len() as i64,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.attempt_count.cmp(&a.attempt_count).then(a.id.cmp(&b.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn favorite_leaders(
        &self,
        exclude: &[i64],
        limit: i64,
    ) -> Result<Vec<FavoriteCount>, AppError> {
        let inner = self.lock()?;
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for (_, topic_id) in &inner.favorites {
            if !exclude.contains(topic_id) {
                *counts.entry(*topic_id).or_insert(0) += 1;
            }
        }
        let mut rows: Vec<FavoriteCount> = counts
            .into_iter()
            .filter_map(|(topic_id, favorites)| {
                let topic = inner.topics.iter().find(|t| t.id == topic_id)?;
                Some(FavoriteCount {
                    topic: topic.clone(),
                    favorites,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.favorites.cmp(&a.favorites).then(a.topic.id.cmp(&b.topic.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn topics_excluding(&self, exclude: &[i64], limit: i64) -> Result<Vec<Topic>, AppError> {
        let inner = self.lock()?;
        let mut topics: Vec<Topic> = inner
            .topics
            .iter()
            .filter(|t| !exclude.contains(&t.id))
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.id);
        topics.truncate(limit as usize);
        Ok(topics)
    }

    async fn unattempted_quizzes_by_topic_ids(
        &self,
        user_id: i64,
        topic_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError> {
        let inner = self.lock()?;
        Ok(inner.unattempted_quizzes(user_id, limit, |topic| topic_ids.contains(&topic.id)))
    }

    async fn unattempted_quizzes_by_topic_names(
        &self,
        user_id: i64,
        names: &[String],
        limit: i64,
    ) -> Result<Vec<RecommendedQuiz>, AppError> {
        let inner = self.lock()?;
        Ok(inner.unattempted_quizzes(user_id, limit, |topic| names.contains(&topic.name)))
    }

    async fn upsert_statistics(
        &self,
        user_id: i64,
        rollup: &Rollup,
    ) -> Result<UserStatistics, AppError> {
        let mut inner = self.lock()?;
        let stats = UserStatistics {
            user_id,
            total_quizzes: rollup.total_quizzes,
            completed_quizzes: rollup.completed_quizzes,
            correct_answers: rollup.correct_answers,
            wrong_answers: rollup.wrong_answers,
            average_accuracy: rollup.average_accuracy,
            topics_attempted: rollup.topics_attempted,
            last_updated: Utc::now(),
        };
        if let Some(existing) = inner.statistics.iter_mut().find(|s| s.user_id == user_id) {
            *existing = stats.clone();
        } else {
            inner.statistics.push(stats.clone());
        }
        Ok(stats)
    }

    async fn statistics_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<UserStatistics>, AppError> {
        let inner = self.lock()?;
        Ok(inner.statistics.iter().find(|s| s.user_id == user_id).cloned())
    }
}
