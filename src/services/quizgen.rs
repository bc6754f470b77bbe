// src/services/quizgen.rs

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, utils::html::clean_html};

/// A single multiple-choice question produced by the model.
///
/// `answer` holds the exact text of the correct option, not an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct QuizGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl QuizGenerator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            temperature: 0.7,
        }
    }

    /// Asks the model for `count` questions about `topic`.
    ///
    /// A reply the model garbles into something unparseable yields an empty
    /// list rather than an error; transport failures and a missing API key
    /// surface as 500s.
    pub async fn generate(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::InternalServerError("OPENAI_API_KEY is not configured".to_string())
        })?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system",
                content: build_prompt(topic, count),
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(extract_questions(&content))
    }
}

fn build_prompt(topic: &str, count: u32) -> String {
    format!(
        "Generate {count} multiple choice questions about \"{topic}\". \
         Respond with only a JSON array in which every element has the shape \
         {{\"question\": \"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \
         \"answer\": \"...\"}}. \"answer\" must repeat the exact text of the \
         correct option. Do not wrap the array in markdown fences or add prose."
    )
}

/// Pulls the first JSON array out of the model's reply and parses it.
///
/// Models routinely decorate the array with prose or markdown fences, so the
/// array is located by pattern rather than parsed verbatim. All text fields
/// are sanitized before they reach a client. Anything unparseable becomes an
/// empty list.
pub fn extract_questions(content: &str) -> Vec<GeneratedQuestion> {
    static ARRAY: OnceLock<Regex> = OnceLock::new();
    let pattern = ARRAY.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid regex literal"));

    let Some(found) = pattern.find(content) else {
        tracing::warn!("model reply contained no JSON array");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<GeneratedQuestion>>(found.as_str()) {
        Ok(questions) => questions
            .into_iter()
            .map(|q| GeneratedQuestion {
                question: clean_html(&q.question),
                options: q.options.iter().map(|o| clean_html(o)).collect(),
                answer: clean_html(&q.answer),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("failed to parse generated questions: {}", e);
            Vec::new()
        }
    }
}
