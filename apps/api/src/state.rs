use std::sync::Arc;

use crate::image_client::ImageClient;
use crate::llm_client::LlmClient;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub images: ImageClient,
    /// Plain HTTP client for downloading synthesized panel images.
    pub http: reqwest::Client,
    /// Pluggable document store. Default: in-memory map swept by a background task.
    pub store: Arc<dyn DocumentStore>,
}
