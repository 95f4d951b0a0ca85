//! Async LLM client for narration
//!
//! Model-agnostic HTTP client for text completion and image generation.
//! Supports both Anthropic and OpenAI-compatible APIs. Narration is short,
//! so completions are capped at a few hundred tokens.

use crate::core::error::{CivError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Default token cap for narration
const NARRATION_MAX_TOKENS: u32 = 400;

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    /// Image endpoint, OpenAI-compatible only
    image_url: Option<String>,
    image_model: String,
    max_tokens: u32,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            image_url: None,
            image_model: "dall-e-3".into(),
            max_tokens: NARRATION_MAX_TOKENS,
        }
    }

    /// Enable image generation against an OpenAI-compatible endpoint
    pub fn with_image_endpoint(mut self, url: String, model: String) -> Self {
        self.image_url = Some(url);
        self.image_model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    /// Optional: LLM_IMAGE_URL and LLM_IMAGE_MODEL enable empire snapshots
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| CivError::LlmError("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        let client = Self::new(api_key, api_url, model);
        Ok(match std::env::var("LLM_IMAGE_URL") {
            Ok(url) => {
                let image_model =
                    std::env::var("LLM_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".into());
                client.with_image_endpoint(url, image_model)
            }
            Err(_) => client,
        })
    }

    /// Send a completion request to the LLM
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    /// POST a JSON body and decode the JSON reply
    ///
    /// Transport failures, non-success statuses and undecodable bodies all
    /// surface as `LlmError`.
    async fn post_json<B, R>(&self, url: &str, auth: Auth, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request = self.client.post(url).header("content-type", "application/json");
        let request = match auth {
            Auth::ApiKey => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            Auth::Bearer => request.bearer_auth(&self.api_key),
        };

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| CivError::LlmError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CivError::LlmError(format!("{}: {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|e| CivError::LlmError(e.to_string()))
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message::user(user)],
        };
        let reply: AnthropicResponse = self.post_json(&self.api_url, Auth::ApiKey, &body).await?;

        reply
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| CivError::LlmError("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let body = OpenAIRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message::system(system), Message::user(user)],
        };
        let reply: OpenAIResponse = self.post_json(&self.api_url, Auth::Bearer, &body).await?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CivError::LlmError("Empty response".into()))
    }

    /// Generate an image, returning a URL or a data URI
    ///
    /// `Ok(None)` when no image endpoint is configured or the response holds
    /// no image.
    pub async fn generate_image(&self, prompt: &str) -> Result<Option<String>> {
        let Some(url) = &self.image_url else {
            tracing::debug!("Image generation skipped: no image endpoint");
            return Ok(None);
        };

        let body = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
        };
        let images: ImageResponse = self.post_json(url, Auth::Bearer, &body).await?;

        Ok(images.data.into_iter().next().and_then(ImageData::into_uri))
    }
}

/// How the API key is presented
#[derive(Debug, Clone, Copy)]
enum Auth {
    /// `x-api-key` header (Anthropic)
    ApiKey,
    Bearer,
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Image generation (OpenAI-compatible)
#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

impl ImageData {
    fn into_uri(self) -> Option<String> {
        self.url
            .or_else(|| self.b64_json.map(|b64| format!("data:image/png;base64,{}", b64)))
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> Message<'a> {
    fn system(content: &'a str) -> Self {
        Self { role: "system", content }
    }

    fn user(content: &'a str) -> Self {
        Self { role: "user", content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com".into(),
            "test-model".into(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_format, ApiFormat::OpenAI);
        assert_eq!(client.max_tokens, NARRATION_MAX_TOKENS);
        assert!(client.image_url.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let client = LlmClient::new("k".into(), "https://api.example.com".into(), "m".into())
            .with_max_tokens(1200)
            .with_image_endpoint("https://img.example.com".into(), "img-model".into());
        assert_eq!(client.max_tokens, 1200);
        assert_eq!(client.image_url.as_deref(), Some("https://img.example.com"));
        assert_eq!(client.image_model, "img-model");
    }

    #[test]
    fn test_anthropic_format_detected() {
        let client = LlmClient::new(
            "k".into(),
            "https://api.anthropic.com/v1/messages".into(),
            "m".into(),
        );
        assert_eq!(client.api_format, ApiFormat::Anthropic);
    }

    #[test]
    fn test_image_data_prefers_url() {
        let data = ImageData {
            url: Some("https://img".into()),
            b64_json: Some("AAAA".into()),
        };
        assert_eq!(data.into_uri().as_deref(), Some("https://img"));

        let data = ImageData {
            url: None,
            b64_json: Some("AAAA".into()),
        };
        assert_eq!(data.into_uri().as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_openai_body_shape() {
        let body = OpenAIRequest {
            model: "m",
            max_tokens: 10,
            messages: vec![Message::system("be brief"), Message::user("hello")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 10);
    }

    #[tokio::test]
    async fn test_image_without_endpoint_is_none() {
        let client = LlmClient::new("k".into(), "https://api.example.com".into(), "m".into());
        assert_eq!(client.generate_image("a city").await.unwrap(), None);
    }
}
