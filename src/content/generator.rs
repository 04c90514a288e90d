//! Provider-backed generator that degrades to templated copy.

use super::openai::{CompletionRequest, Message, OpenAiClient, ProviderError, ResponseFormat};
use super::{
    fallback_content, prompt, validate, ContentGenerator, FallbackReason, GenerateError,
    GeneratedContent, Generation,
};
use crate::catalog::CatalogEntry;
use crate::config::Settings;
use async_trait::async_trait;
use std::time::Duration;

const TEMPERATURE: f32 = 0.7;

/// Calls the provider when a credential is configured; otherwise, and on any
/// provider failure, returns [`fallback_content`]. Never returns `Err`.
#[derive(Debug)]
pub struct LlmContentGenerator {
    client: Option<OpenAiClient>,
    model: String,
}

impl LlmContentGenerator {
    /// Fallback-only generator; never touches the network.
    pub fn offline() -> Self {
        LlmContentGenerator {
            client: None,
            model: String::new(),
        }
    }

    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        LlmContentGenerator {
            client: Some(client),
            model: model.into(),
        }
    }

    /// Remote-with-fallback when `OPENAI_API_KEY` is set, fallback-only otherwise.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        match &settings.openai_api_key {
            Some(key) => {
                let client = OpenAiClient::new(
                    key.clone(),
                    settings.openai_base_url.clone(),
                    Duration::from_secs(settings.generation_timeout),
                )?;
                Ok(Self::new(client, settings.openai_model.clone()))
            }
            None => Ok(Self::offline()),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    async fn remote(
        &self,
        client: &OpenAiClient,
        entry: &CatalogEntry,
    ) -> Result<GeneratedContent, FallbackReason> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Some(prompt::build_instruction(entry)),
            }],
            response_format: Some(ResponseFormat::json_object()),
            temperature: Some(TEMPERATURE),
        };

        let raw = client
            .complete(&request)
            .await
            .map_err(|e| FallbackReason::Provider(e.to_string()))?;
        parse_content(&raw)
    }
}

/// Decode and validate a raw provider answer.
pub fn parse_content(raw: &str) -> Result<GeneratedContent, FallbackReason> {
    let content: GeneratedContent = serde_json::from_str(raw.trim())
        .map_err(|e| FallbackReason::InvalidContent(format!("unparseable JSON: {e}")))?;
    validate(&content).map_err(|e| FallbackReason::InvalidContent(e.0))?;
    Ok(content)
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(&self, entry: &CatalogEntry) -> Result<Generation, GenerateError> {
        let Some(client) = &self.client else {
            log::warn!(
                "no provider credential set, using fallback content for \"{}\"",
                entry.display_name
            );
            return Ok(Generation::Fallback {
                content: fallback_content(entry),
                reason: FallbackReason::NoCredential,
            });
        };

        match self.remote(client, entry).await {
            Ok(content) => Ok(Generation::Generated(content)),
            Err(reason) => {
                log::warn!(
                    "generating content for {} failed, using fallback: {reason}",
                    entry.id
                );
                Ok(Generation::Fallback {
                    content: fallback_content(entry),
                    reason,
                })
            }
        }
    }
}
