//! Generative AI integration.
//!
//! Thin client over the `generateContent` REST endpoint used for playground
//! flavor text and images. Every public call goes through [`with_backoff`].

use crate::error::{GlyphBotsError, Result};
use crate::retry::{with_backoff, RetryPolicy};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// A decoded image returned by the image model.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Client for the generative AI API.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    retry: RetryPolicy,
}

impl GenAiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            text_model: text_model.into(),
            image_model: image_model.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used by `generate_text` and `generate_image`.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate flavor text, retrying transient failures.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        with_backoff(self.retry, "generate text", || self.generate_text_once(prompt)).await
    }

    /// Generate an image, retrying transient failures.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        with_backoff(self.retry, "generate image", || self.generate_image_once(prompt)).await
    }

    /// Single text generation attempt.
    pub async fn generate_text_once(&self, prompt: &str) -> Result<String> {
        let config = GenerationConfig {
            response_modalities: None,
            temperature: Some(0.9),
        };
        let response = self.generate(&self.text_model, prompt, config).await?;

        let text: String = first_parts(response)?
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim().to_string();

        if text.is_empty() {
            return Err(GlyphBotsError::GenAi {
                status: None,
                message: "Model returned no text".to_string(),
            });
        }
        Ok(text)
    }

    /// Single image generation attempt.
    pub async fn generate_image_once(&self, prompt: &str) -> Result<GeneratedImage> {
        let config = GenerationConfig {
            response_modalities: Some(vec!["TEXT", "IMAGE"]),
            temperature: None,
        };
        let response = self.generate(&self.image_model, prompt, config).await?;

        let inline = first_parts(response)?
            .into_iter()
            .find_map(|part| part.inline_data)
            .ok_or_else(|| GlyphBotsError::GenAi {
                status: None,
                message: "Model returned no image".to_string(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| GlyphBotsError::GenAi {
                status: None,
                message: format!("Invalid image data: {}", e),
            })?;

        debug!(bytes = bytes.len(), mime_type = %inline.mime_type, "image generated");
        Ok(GeneratedImage {
            bytes,
            mime_type: inline.mime_type,
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<GenerateResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: Some(config),
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GlyphBotsError::gen_ai(
                status.as_u16(),
                crate::utils::format::truncate(&text, 300),
            ));
        }

        resp.json::<GenerateResponse>().await.map_err(|e| GlyphBotsError::GenAi {
            status: None,
            message: format!("Invalid response: {}", e),
        })
    }
}

fn first_parts(response: GenerateResponse) -> Result<Vec<ResponsePart>> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GlyphBotsError::GenAi {
            status: None,
            message: format!("Prompt blocked: {}", reason),
        });
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| GlyphBotsError::GenAi {
        status: None,
        message: "Model returned no candidates".to_string(),
    })?;

    match candidate.content {
        Some(content) => Ok(content.parts),
        None => Err(GlyphBotsError::GenAi {
            status: None,
            message: format!(
                "Candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(url: String) -> GenAiClient {
        GenAiClient::new(reqwest::Client::new(), url, "test-key", "text-model", "image-model")
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                multiplier: 2,
            })
    }

    const TEXT_RESPONSE: &str = r#"{
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Gears hum "}, {"text": "at dawn."}]},
            "finishReason": "STOP"
        }]
    }"#;

    #[tokio::test]
    async fn test_generate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/text-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"contents": [{"role": "user", "parts": [{"text": "hello"}]}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TEXT_RESPONSE)
            .create_async()
            .await;

        let text = client(server.url()).generate_text("hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Gears hum at dawn.");
    }

    #[tokio::test]
    async fn test_generate_text_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/models/text-model:generateContent")
            .with_status(503)
            .with_body("overloaded")
            .expect(3)
            .create_async()
            .await;

        let result = client(server.url()).generate_text("hello").await;

        failing.assert_async().await;
        assert!(matches!(result, Err(GlyphBotsError::GenAi { status: Some(503), .. })));
    }

    #[tokio::test]
    async fn test_generate_text_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/models/text-model:generateContent")
            .with_status(400)
            .with_body("bad request")
            .expect(1)
            .create_async()
            .await;

        let result = client(server.url()).generate_text("hello").await;

        failing.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generate_text_blocked_prompt() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/text-model:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let result = client(server.url()).generate_text("hello").await;
        assert!(matches!(
            result,
            Err(GlyphBotsError::GenAi { message, .. }) if message.contains("SAFETY")
        ));
    }

    #[tokio::test]
    async fn test_generate_image() {
        let mut server = mockito::Server::new_async().await;
        // "PNGDATA" base64-encoded
        server
            .mock("POST", "/models/image-model:generateContent")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates": [{"content": {"parts": [
                    {"text": "Here is your image"},
                    {"inlineData": {"mimeType": "image/png", "data": "UE5HREFUQQ=="}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let image = client(server.url()).generate_image("a robot").await.unwrap();
        assert_eq!(image.bytes, b"PNGDATA");
        assert_eq!(image.extension(), "png");
    }

    #[tokio::test]
    async fn test_generate_image_without_inline_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/image-model:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TEXT_RESPONSE)
            .create_async()
            .await;

        let result = client(server.url()).generate_image("a robot").await;
        assert!(matches!(
            result,
            Err(GlyphBotsError::GenAi { message, .. }) if message.contains("no image")
        ));
    }
}
