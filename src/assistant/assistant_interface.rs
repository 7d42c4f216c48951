use async_trait::async_trait;

use super::error::AssistantError;

/// Narrow capability over the remote assistant.
///
/// One call is one complete, independent exchange: the implementation
/// opens its own conversation, posts `code`, waits for the run to finish
/// and returns the latest reply text (empty when the assistant said nothing).
#[async_trait]
pub trait AssistantInterface: Send + Sync {
    async fn submit(&self, code: &str) -> Result<String, AssistantError>;

    /// Whether the assistant has what it needs to serve requests
    fn is_configured(&self) -> bool {
        true
    }
}
