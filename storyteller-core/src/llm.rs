//! Text-generation boundary.
//!
//! Every node talks to the model through [`TextGenerator::complete`]. The
//! graph does not care which provider answers, only that structured calls
//! come back as strict JSON and free-text calls as plain text.

use async_trait::async_trait;
use claude::{Claude, Message, Request};
use std::time::Duration;
use thiserror::Error;

/// Failures of the generation call itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation service error: {0}")]
    Service(#[from] claude::Error),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation service returned empty content")]
    EmptyResponse,

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
}

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: usize,
    pub temperature: f32,
}

impl GenerationParams {
    pub const fn new(max_tokens: usize, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// A synchronous-per-turn, non-streaming text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt`, returning the model's text.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GenerationError>;
}

/// Call `generator` with `params`, rejecting blank replies.
pub(crate) async fn complete_with(
    generator: &dyn TextGenerator,
    prompt: &str,
    params: GenerationParams,
) -> Result<String, GenerationError> {
    let text = generator
        .complete(prompt, params.max_tokens, params.temperature)
        .await?;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for Claude {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let request = Request::new(vec![Message::user(prompt)])
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);

        let response = Claude::complete(self, request).await.map_err(|e| match e {
            claude::Error::Timeout(duration) => GenerationError::Timeout(duration),
            other => GenerationError::Service(other),
        })?;

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "generation finished"
        );
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_blank_reply_is_upstream_error() {
        let generator = ScriptedGenerator::new(["   \n"]);
        let err = complete_with(&generator, "prompt", GenerationParams::new(10, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_params_are_forwarded() {
        let generator = ScriptedGenerator::new(["ok"]);
        let text = complete_with(&generator, "prompt", GenerationParams::new(42, 0.5))
            .await
            .unwrap();
        assert_eq!(text, "ok");
        let calls = generator.calls().await;
        assert_eq!(calls[0].max_tokens, 42);
        assert_eq!(calls[0].temperature, 0.5);
    }
}
