//! Axum route handlers for the card API.
//!
//! Generate pipeline: derive → artwork (front + inside, joined) → compose →
//! store. Any failure converts to a JSON error at this boundary; no document
//! is stored unless the whole pipeline succeeds.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cards::artwork::{request_artwork, Side};
use crate::cards::composer::compose;
use crate::cards::deriver::{derive_card_fields, CardFields};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub front_image_url: String,
    pub inside_image_url: String,
    pub pdf_url: String,
    pub card_details: CardFields,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Cardsmith</title>
</head>
<body>
  <h1>Cardsmith</h1>
  <p>POST a JSON body like <code>{"prompt": "a birthday card for Maya"}</code>
     to <code>/generate</code>, then fetch the returned <code>pdf_url</code>.</p>
</body>
</html>
"#;

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /generate
///
/// Full card pipeline: derive content → synthesize both panels → compose PDF
/// → store. Responds with both image URLs, the retrieval path, and the
/// derived fields.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = match request.prompt.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(AppError::Validation("No prompt provided".to_string())),
    };

    info!("Deriving card content");
    let fields = derive_card_fields(prompt, &state.llm).await?;
    info!("Card content derived: category={:?}", fields.category);

    // The two panels are independent; synthesize them concurrently.
    let (front, inside) = tokio::join!(
        request_artwork(&state.images, &fields, Side::Front),
        request_artwork(&state.images, &fields, Side::Inside),
    );
    let (front_image_url, inside_image_url) = match (front, inside) {
        (Ok(front_url), Ok(inside_url)) => (front_url, inside_url),
        // Surface both messages when both panels fail.
        (Err(AppError::Upstream(front_err)), Err(AppError::Upstream(inside_err))) => {
            return Err(AppError::Upstream(format!("{front_err}; {inside_err}")));
        }
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };

    let pdf = compose(&state.http, &front_image_url, &inside_image_url).await?;

    let filename = state.store.put(pdf, fields.clone()).await;
    info!("Stored card document {filename}");

    Ok(Json(GenerateResponse {
        front_image_url,
        inside_image_url,
        pdf_url: format!("/download_pdf/{filename}"),
        card_details: fields,
    }))
}

/// GET /download_pdf/:filename
///
/// Streams the stored PDF back as an attachment named after the card's
/// occasion. Unknown and expired identifiers are indistinguishable: both 404.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let document = state
        .store
        .get(&filename)
        .await
        .ok_or_else(|| AppError::NotFound(format!("PDF {filename} not found")))?;

    let occasion = document.fields.occasion.as_deref().unwrap_or("greeting");
    let download_name = format!("greeting_card_{}.pdf", sanitize_occasion(occasion));
    info!("Serving card document {}", document.filename);

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{download_name}\""),
        ),
    ];

    Ok((headers, document.bytes).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Filename sanitization
// ────────────────────────────────────────────────────────────────────────────

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-_\. ]").expect("valid sanitize pattern"));

/// Makes an occasion string safe for use as a filename component:
/// characters outside word characters, hyphen, underscore, dot, and space
/// become underscores, then spaces become underscores, lowercased.
pub fn sanitize_occasion(occasion: &str) -> String {
    UNSAFE_CHARS
        .replace_all(occasion, "_")
        .replace(' ', "_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_new_years_eve() {
        assert_eq!(sanitize_occasion("New Year's Eve!"), "new_year_s_eve_");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_occasion("Congrats on the Promotion!!");
        let twice = sanitize_occasion(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_occasion("mid-year_check.in"), "mid-year_check.in");
    }

    #[test]
    fn test_sanitize_lowercases() {
        assert_eq!(sanitize_occasion("BIRTHDAY"), "birthday");
    }

    #[test]
    fn test_sanitize_replaces_each_unsafe_character() {
        assert_eq!(sanitize_occasion("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn test_generate_request_tolerates_missing_prompt() {
        let request: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(request.prompt.is_none());
    }

    #[test]
    fn test_generate_request_reads_prompt() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"prompt": "a thank-you card for my mentor"}"#).unwrap();
        assert_eq!(request.prompt.as_deref(), Some("a thank-you card for my mentor"));
    }
}
