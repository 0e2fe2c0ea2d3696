/// Image Client — the single point of entry for all image-synthesis calls in Cardsmith.
///
/// ARCHITECTURAL RULE: No other module may call the fal.ai API directly.
/// All synthesis requests MUST go through this module.
///
/// Endpoint: fal-ai/flux-pro via the synchronous fal.run gateway. The call
/// blocks until the image is ready and returns a hosted URL.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const FAL_RUN_URL: &str = "https://fal.run/fal-ai/flux-pro";
/// Portrait orientation for both card panels.
pub const IMAGE_SIZE: &str = "portrait_4_3";

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Synthesis returned no images")]
    NoImages,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    prompt: &'a str,
    image_size: &'a str,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    images: Vec<SynthesizedImage>,
}

#[derive(Debug, Deserialize)]
struct SynthesizedImage {
    url: String,
}

/// The single image-synthesis client used by the card pipeline.
/// Calls are made exactly once: a transient upstream failure surfaces
/// immediately to the caller rather than being retried.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_key: String,
}

impl ImageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Submits a synthesis prompt and returns the URL of the generated image.
    pub async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        let request_body = SynthesisRequest {
            prompt,
            image_size: IMAGE_SIZE,
        };

        let response = self
            .client
            .post(FAL_RUN_URL)
            .header("Authorization", format!("Key {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let synthesis: SynthesisResponse = response.json().await?;

        debug!("Synthesis succeeded: {} image(s)", synthesis.images.len());

        synthesis
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or(ImageGenError::NoImages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_prompt_and_size() {
        let request = SynthesisRequest {
            prompt: "A greeting card design",
            image_size: IMAGE_SIZE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "A greeting card design");
        assert_eq!(json["image_size"], "portrait_4_3");
    }

    #[test]
    fn test_response_deserializes_from_api_shape() {
        let json = r#"{
            "images": [
                {"url": "https://fal.media/files/abc/front.png", "width": 768, "height": 1024}
            ],
            "seed": 42
        }"#;
        let response: SynthesisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].url, "https://fal.media/files/abc/front.png");
    }

    #[test]
    fn test_empty_image_list_deserializes() {
        let response: SynthesisResponse = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert!(response.images.is_empty());
    }
}
