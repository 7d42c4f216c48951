use std::sync::Arc;

use crate::assistant::{AssistantInterface, OpenAIAssistant};
use crate::config::Config;
use crate::translator::{FallbackPolicy, TranslationGateway};

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<TranslationGateway>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let assistant = Arc::new(OpenAIAssistant::new(&config.assistant_config)?);
        Ok(Self::with_assistant(config, assistant))
    }

    /// Build state around any assistant implementation.
    pub fn with_assistant(config: Config, assistant: Arc<dyn AssistantInterface>) -> Self {
        let policy = FallbackPolicy::from_phrases(
            config.translator_config.fallback_phrases.clone(),
            config.translator_config.min_reply_chars,
        );

        Self {
            config: Arc::new(config),
            gateway: Arc::new(TranslationGateway::new(assistant, policy)),
        }
    }
}
