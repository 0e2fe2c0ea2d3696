//! Content Deriver — turns the user's free-text prompt into structured card fields.
//!
//! The model replies in a fixed `Key: value` line format; parsing splits each
//! line on the first colon and trims both sides. A reply with no colon-delimited
//! lines parses to the empty struct rather than erroring — missing fields
//! surface downstream as `MissingField` when a consumer needs them.

use serde::{Deserialize, Serialize};

use crate::cards::prompts::CARD_SYSTEM;
use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Structured card content derived from the model reply.
/// Serialized under the original reply keys so `card_details` in the
/// `/generate` response mirrors what the model produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Occasion/Sentiment", skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(rename = "Recipient(s)", skip_serializing_if = "Option::is_none")]
    pub recipients: Option<String>,
    #[serde(rename = "Front Page Text", skip_serializing_if = "Option::is_none")]
    pub front_text: Option<String>,
    #[serde(rename = "Inside Message", skip_serializing_if = "Option::is_none")]
    pub inside_message: Option<String>,
}

/// Parses a model reply into `CardFields`.
/// Line order is irrelevant; a later duplicate key overwrites an earlier one;
/// lines without a colon and unknown keys are ignored.
pub fn parse_card_fields(reply: &str) -> CardFields {
    let mut fields = CardFields::default();

    for line in reply.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Category" => fields.category = Some(value),
            "Occasion/Sentiment" => fields.occasion = Some(value),
            "Recipient(s)" => fields.recipients = Some(value),
            "Front Page Text" => fields.front_text = Some(value),
            "Inside Message" => fields.inside_message = Some(value),
            _ => {}
        }
    }

    fields
}

/// Derives card content for a user prompt via the LLM.
pub async fn derive_card_fields(prompt: &str, llm: &LlmClient) -> Result<CardFields, AppError> {
    let response = llm
        .call(prompt, CARD_SYSTEM)
        .await
        .map_err(|e| AppError::Upstream(format!("card content derivation failed: {e}")))?;

    let text = response
        .text()
        .ok_or_else(|| AppError::Upstream("completion returned no text content".to_string()))?;

    Ok(parse_card_fields(text))
}
