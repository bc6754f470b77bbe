// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// The text content of the question.
    pub text: String,

    /// Ordered option list. Normally a JSON array of strings, but rows
    /// written by the legacy importer hold a JSON string containing a
    /// serialized array; read through [`Question::decoded_options`] instead
    /// of touching this directly.
    pub options: serde_json::Value,

    /// The correct option text (resolved text, not an index).
    pub correct_answer: String,

    /// Explanation shown after answering.
    pub explanation: Option<String>,

    pub points: i64,

    /// Display position within the quiz; ties fall back to insertion order.
    pub order_index: i64,
}

impl Question {
    /// Decodes `options` into its logical form. An undecodable payload
    /// yields an empty list so one corrupt question cannot abort a request.
    pub fn decoded_options(&self) -> Vec<String> {
        decode_options(&self.options)
    }
}

/// Accepts both transport shapes for an option list: a structured JSON array
/// of strings, or a JSON string holding a serialized array.
pub fn decode_options(raw: &serde_json::Value) -> Vec<String> {
    let decoded = match raw {
        serde_json::Value::String(text) => serde_json::from_str::<Vec<String>>(text),
        other => serde_json::from_value::<Vec<String>>(other.clone()),
    };
    match decoded {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!("Failed to decode question options: {}", err);
            Vec::new()
        }
    }
}
