//! Embedding providers.
//!
//! The resolver treats the embedding model as a black box behind
//! [`EmbeddingProvider`]. [`OpenAIProvider`] speaks the OpenAI `/embeddings`
//! wire format, which hosted APIs and local sentence-transformer servers
//! both expose.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::{DEFAULT_DIMENSION, Embedding};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Request for generating embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Text to embed.
    pub text: String,
}

impl EmbeddingRequest {
    /// Create a new embedding request.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Response from embedding generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The generated embedding.
    pub embedding: Embedding,

    /// Model used to generate the embedding.
    pub model: String,

    /// Dimension of the embedding.
    pub dimension: usize,

    /// Token usage (if available).
    pub tokens_used: Option<u64>,
}

/// Trait for embedding providers.
///
/// Implementations must be deterministic for a given model: the same text
/// always maps to the same vector, and the dimension is fixed when the
/// corpus is built.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Get the default embedding dimension.
    fn default_dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse>;

    /// Check if the provider is usable (API key set, endpoint known, etc.).
    fn is_available(&self) -> bool;
}

/// Provider for any endpoint implementing the OpenAI embeddings API.
pub struct OpenAIProvider {
    /// API key. Optional for self-hosted endpoints.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Default model.
    default_model: String,

    /// Dimension every returned vector must have.
    dimension: usize,
}

impl OpenAIProvider {
    /// Create a new provider against the public OpenAI API.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: OPENAI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            default_model: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimension: DEFAULT_DIMENSION,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the expected embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    fn is_self_hosted(&self) -> bool {
        self.base_url != OPENAI_BASE_URL
    }

    fn post(&self, body: &serde_json::Value) -> Result<reqwest::RequestBuilder> {
        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Content-Type", "application/json")
            .json(body);

        match &self.api_key {
            Some(api_key) => {
                builder = builder.header("Authorization", format!("Bearer {api_key}"));
            }
            None if !self.is_self_hosted() => return Err(EmbeddingError::ProviderNotConfigured),
            None => {}
        }

        Ok(builder)
    }

    async fn send(&self, body: serde_json::Value) -> Result<OpenAIEmbeddingResponse> {
        let response = self.post(&body)?.send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error ({status}): {error_text}"
            )));
        }

        Ok(response.json().await?)
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn default_dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        debug!("Generating embedding with model: {}", self.default_model);

        let body = serde_json::json!({
            "input": request.text,
            "model": self.default_model
        });

        let result = self.send(body).await?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))?
            .embedding;
        self.check_dimension(&embedding)?;

        let dimension = embedding.len();
        let tokens_used = result.usage.map(|u| u.total_tokens);

        debug!("Generated embedding with {dimension} dimensions");

        Ok(EmbeddingResponse {
            embedding,
            model: result.model,
            dimension,
            tokens_used,
        })
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() || self.is_self_hosted()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedding_body(vectors: &[Vec<f32>]) -> serde_json::Value {
        let data: Vec<serde_json::Value> = vectors
            .iter()
            .enumerate()
            .map(|(index, v)| serde_json::json!({ "embedding": v, "index": index }))
            .collect();
        serde_json::json!({
            "data": data,
            "model": "test-model",
            "usage": { "prompt_tokens": 3, "total_tokens": 3 }
        })
    }

    #[tokio::test]
    async fn test_embed_sends_configured_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_json(serde_json::json!({
                "input": "manjo de solda",
                "model": "multilingual-mini"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(embedding_body(&[vec![0.6, 0.8]])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_base_url(server.uri())
            .with_model("multilingual-mini")
            .with_dimension(2);
        let response = provider
            .embed(EmbeddingRequest::new("manjo de solda"))
            .await
            .unwrap();

        assert_eq!(response.model, "test-model");
        assert_eq!(provider.default_model(), "multilingual-mini");
    }

    #[test]
    fn test_self_hosted_provider_needs_no_key() {
        let provider = OpenAIProvider::new().with_base_url("http://localhost:8080/v1/");
        assert!(provider.is_available());
        assert_eq!(provider.default_dimension(), DEFAULT_DIMENSION);
    }

    #[tokio::test]
    async fn test_embed_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[vec![
                0.1, 0.2, 0.3,
            ]])))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_base_url(server.uri())
            .with_api_key("secret")
            .with_dimension(3);
        let response = provider
            .embed(EmbeddingRequest::new("soldagem"))
            .await
            .unwrap();

        assert_eq!(response.embedding, vec![0.1, 0.2, 0.3]);
        assert_eq!(response.dimension, 3);
        assert_eq!(response.tokens_used, Some(3));
    }

    #[tokio::test]
    async fn test_embed_rejects_wrong_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(embedding_body(&[vec![0.1, 0.2]])),
            )
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_base_url(server.uri())
            .with_dimension(3);
        let err = provider
            .embed(EmbeddingRequest::new("soldagem"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new().with_base_url(server.uri());
        let err = provider
            .embed(EmbeddingRequest::new("x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 7
            }
        ));
    }
}
