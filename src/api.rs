//! # API Module
//!
//! Embedding client for the OpenAI-compatible `/embeddings` endpoint.
//!
//! The rest of the crate talks to the [`Embedder`] trait; [`OpenAiEmbedder`] is
//! the production implementation built on `async-openai`. One call to
//! [`Embedder::embed`] issues exactly one HTTP request. Failures (network,
//! authentication, rate limits, empty responses) are returned to the caller
//! unchanged.
//!
//! # Example
//!
//! ```no_run
//! use policy_probe::api::{Embedder, OpenAiEmbedder};
//! use policy_probe::config::ProbeConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig::default();
//! let embedder = OpenAiEmbedder::new(&config, "sk-...")?;
//! let vector = embedder.embed("청년 주거 지원 정책은?").await?;
//! println!("{} dimensions", vector.len());
//! # Ok(()) }
//! ```
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
};
use std::error::Error;
use tracing::debug;

use crate::config::ProbeConfig;

/// Embedding model used when nothing else is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Turns text into an embedding vector.
#[allow(async_fn_in_trait)]
pub trait Embedder {
    /// Embed `text`. Implementations normalize it with [`normalize_text`].
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Box<dyn Error>>;
}

/// Replace newlines with spaces; embedding endpoints treat them specially.
///
/// `\r\n` collapses to a single space.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Creates a new OpenAI API client from configuration.
///
/// # Parameters
/// - `config: &ProbeConfig`: Configuration containing the API base.
/// - `api_key: &str`: Credential sent as the bearer token.
fn create_client(config: &ProbeConfig, api_key: &str) -> Client<OpenAIConfig> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.api_base.clone());
    debug!("Client created for api base {}", config.api_base);
    Client::with_config(openai_config)
}

/// [`Embedder`] backed by an OpenAI-compatible HTTP API.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// Build an embedder for `config.embedding_model` at `config.api_base`.
    ///
    /// # Errors
    /// Returns an error when `api_key` is empty.
    pub fn new(config: &ProbeConfig, api_key: &str) -> Result<Self, Box<dyn Error>> {
        if api_key.trim().is_empty() {
            return Err("missing API key: set OPENAI_API_KEY or api_key in config.yaml".into());
        }
        Ok(Self {
            client: create_client(config, api_key),
            model: config.embedding_model.clone(),
        })
    }

    /// Model id sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Box<dyn Error>> {
        let input = normalize_text(text);
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(EmbeddingInput::StringArray(vec![input]))
            .build()?;

        debug!("Requesting embedding with model {}", self.model);
        let response = self.client.embeddings().create(request).await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or("embedding response contained no data")?;
        debug!("Received embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn setup() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn mock_config(api_base: String) -> ProbeConfig {
        ProbeConfig {
            api_base,
            ..ProbeConfig::default()
        }
    }

    fn embedding_body(vector: &[f32]) -> serde_json::Value {
        json!({
            "object": "list",
            "model": DEFAULT_EMBEDDING_MODEL,
            "data": [
                { "object": "embedding", "index": 0, "embedding": vector }
            ],
            "usage": { "prompt_tokens": 5, "total_tokens": 5 }
        })
    }

    #[test]
    fn test_normalize_text_removes_newlines() {
        for input in ["a\nb", "a\r\nb", "\n\n", "line one\nline two\rthree", "plain"] {
            let normalized = normalize_text(input);
            assert!(!normalized.contains('\n'), "{normalized:?}");
            assert!(!normalized.contains('\r'), "{normalized:?}");
        }
        assert_eq!(normalize_text("청년\n주거"), "청년 주거");
        assert_eq!(normalize_text("a\r\nb"), "a b");
    }

    #[test]
    fn test_normalize_text_is_idempotent() {
        let once = normalize_text("a\nb\r\nc");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let config = ProbeConfig::default();
        assert!(OpenAiEmbedder::new(&config, "  ").is_err());
        assert!(OpenAiEmbedder::new(&config, "sk-test").is_ok());
    }

    #[tokio::test]
    async fn test_embed_sends_normalized_text() {
        setup();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/embeddings")
                    .body_includes("취업 지원 프로그램")
                    .body_includes(DEFAULT_EMBEDDING_MODEL);
                then.status(200).json_body(embedding_body(&[0.1, 0.2, 0.3]));
            })
            .await;

        let embedder = OpenAiEmbedder::new(&mock_config(server.base_url()), "sk-test").unwrap();
        let vector = embedder.embed("취업\n지원 프로그램").await.unwrap();

        mock.assert_async().await;
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_propagates_auth_failure() {
        setup();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(401).json_body(json!({
                    "error": {
                        "message": "Incorrect API key provided",
                        "type": "invalid_request_error",
                        "param": null,
                        "code": "invalid_api_key"
                    }
                }));
            })
            .await;

        let embedder = OpenAiEmbedder::new(&mock_config(server.base_url()), "sk-bad").unwrap();
        let err = embedder.embed("교육 바우처 지원").await.unwrap_err();
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_embed_rejects_empty_data() {
        setup();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({
                    "object": "list",
                    "model": DEFAULT_EMBEDDING_MODEL,
                    "data": [],
                    "usage": { "prompt_tokens": 0, "total_tokens": 0 }
                }));
            })
            .await;

        let embedder = OpenAiEmbedder::new(&mock_config(server.base_url()), "sk-test").unwrap();
        let err = embedder.embed("x").await.unwrap_err();
        assert!(err.to_string().contains("no data"));
    }
}
