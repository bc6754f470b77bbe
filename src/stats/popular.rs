// src/stats/popular.rs

use crate::config::POPULAR_TOPIC_LIMIT;
use crate::error::AppError;
use crate::models::stats::PopularTopic;
use crate::store::QuizStore;

/// Builds the site-wide popular-topics list: topics ranked by attempt count,
/// padded first with favorite-ranked topics and then with whatever topics
/// remain, until 5 entries exist or topics run out. Padded entries carry an
/// attempt count of 0; favorite-padded ones reuse `unique_users` for their
/// favorite count.
pub async fn popular_topics(store: &dyn QuizStore) -> Result<Vec<PopularTopic>, AppError> {
    let mut topics = store.global_topic_attempts(POPULAR_TOPIC_LIMIT).await?;

    if (topics.len() as i64) < POPULAR_TOPIC_LIMIT {
        let exclude: Vec<i64> = topics.iter().map(|t| t.id).collect();
        let needed = POPULAR_TOPIC_LIMIT - topics.len() as i64;
        let leaders = store.favorite_leaders(&exclude, needed).await?;
        topics.extend(leaders.into_iter().map(|leader| PopularTopic {
            id: leader.topic.id,
            name: leader.topic.name,
            description: leader.topic.description.unwrap_or_default(),
            attempt_count: 0,
            unique_users: leader.favorites,
        }));
    }

    if (topics.len() as i64) < POPULAR_TOPIC_LIMIT {
        let exclude: Vec<i64> = topics.iter().map(|t| t.id).collect();
        let needed = POPULAR_TOPIC_LIMIT - topics.len() as i64;
        let rest = store.topics_excluding(&exclude, needed).await?;
        topics.extend(rest.into_iter().map(|topic| PopularTopic {
            id: topic.id,
            name: topic.name,
            description: topic.description.unwrap_or_default(),
            attempt_count: 0,
            unique_users: 0,
        }));
    }

    Ok(topics)
}
