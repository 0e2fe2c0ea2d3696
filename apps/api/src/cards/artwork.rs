//! Artwork Requester — builds one synthesis prompt per panel side and submits
//! it through the image client.
//!
//! The two sides are independent; handle_generate joins them concurrently.
//! A missing derived field fails fast with `MissingField` before any
//! synthesis call is spent.

use std::fmt;

use crate::cards::deriver::CardFields;
use crate::cards::prompts::{FRONT_PANEL_PROMPT_TEMPLATE, INSIDE_PANEL_PROMPT_TEMPLATE};
use crate::errors::AppError;
use crate::image_client::ImageClient;

/// The two printable sides of the card, each rendered as one PDF page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Inside,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Inside => write!(f, "inside"),
        }
    }
}

fn require<'a>(
    value: &'a Option<String>,
    key: &'static str,
    stage: &'static str,
) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or(AppError::MissingField { key, stage })
}

/// Builds the natural-language synthesis prompt for one panel side.
pub fn panel_prompt(fields: &CardFields, side: Side) -> Result<String, AppError> {
    match side {
        Side::Front => {
            let front_text = require(&fields.front_text, "Front Page Text", "front panel prompt")?;
            let occasion = require(&fields.occasion, "Occasion/Sentiment", "front panel prompt")?;
            Ok(FRONT_PANEL_PROMPT_TEMPLATE
                .replace("{front_text}", front_text)
                .replace("{occasion}", occasion))
        }
        Side::Inside => {
            let occasion = require(&fields.occasion, "Occasion/Sentiment", "inside panel prompt")?;
            let message = require(&fields.inside_message, "Inside Message", "inside panel prompt")?;
            Ok(INSIDE_PANEL_PROMPT_TEMPLATE
                .replace("{occasion}", occasion)
                .replace("{inside_message}", message))
        }
    }
}

/// Requests artwork for one panel side and returns the hosted image URL.
pub async fn request_artwork(
    images: &ImageClient,
    fields: &CardFields,
    side: Side,
) -> Result<String, AppError> {
    let prompt = panel_prompt(fields, side)?;
    images
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Upstream(format!("{side} panel synthesis failed: {e}")))
}
