mod gemini;
pub mod models;
pub mod prompt;

pub use gemini::GeminiModel;
pub use models::{ActionDescriptor, ActionKind, EventIntent, IntentPayload, TaskIntent};

use crate::error::{parse_error, AgentResult, Error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One structured generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub text: String,
    pub response_schema: Value,
}

/// Language-understanding service constrained to a JSON schema
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Run the request and return the raw model text
    async fn generate(&self, request: &GenerationRequest) -> AgentResult<String>;
}

/// Turns free-form text into an action descriptor
#[derive(Clone)]
pub struct IntentResolver {
    model: Arc<dyn LanguageModel>,
}

impl IntentResolver {
    /// Create a resolver on top of a language model
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classify the text and extract its parameters
    ///
    /// Relative times are resolved by the model against `now` in `timezone`.
    /// Failures of the model call are not retried.
    pub async fn resolve(
        &self,
        text: &str,
        now: DateTime<Utc>,
        timezone: &str,
    ) -> AgentResult<ActionDescriptor> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("No text provided".to_string()));
        }

        let request = GenerationRequest {
            system_instruction: prompt::build_system_instruction(now, timezone),
            text: text.to_string(),
            response_schema: prompt::response_schema(),
        };

        let raw = self.model.generate(&request).await?;
        debug!("Model output: {}", raw);

        let descriptor = parse_intent(&raw).inspect_err(|e| {
            error!("Failed to parse model output: {}", e);
        })?;
        info!("Resolved intent: {}", descriptor.name());

        Ok(descriptor)
    }
}

/// Parse the model output into a descriptor
///
/// The output must be a JSON object matching the response schema, optionally
/// wrapped in a fenced code block.
pub fn parse_intent(raw: &str) -> AgentResult<ActionDescriptor> {
    let json = strip_code_fence(raw.trim());
    if json.is_empty() {
        return Err(parse_error("Empty response from language model"));
    }

    let payload: IntentPayload = serde_json::from_str(json)
        .map_err(|e| parse_error(&format!("Malformed intent JSON: {}", e)))?;

    ActionDescriptor::try_from(payload)
}

fn strip_code_fence(text: &str) -> &str {
    match text.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => text,
    }
}
