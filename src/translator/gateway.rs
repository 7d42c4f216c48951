use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::classifier::FallbackPolicy;
use super::interface::{LookupRequest, LookupResult};
use crate::assistant::AssistantInterface;

/// Trim the raw code and optionally upper-case it.
pub fn normalize_code(raw: &str, uppercase: bool) -> String {
    let trimmed = raw.trim();
    if uppercase {
        trimmed.to_uppercase()
    } else {
        trimmed.to_string()
    }
}

/// Forwards occupational codes to the assistant and classifies its reply.
pub struct TranslationGateway {
    assistant: Arc<dyn AssistantInterface>,
    policy: FallbackPolicy,
}

impl TranslationGateway {
    pub fn new(assistant: Arc<dyn AssistantInterface>, policy: FallbackPolicy) -> Self {
        Self { assistant, policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    pub fn assistant_configured(&self) -> bool {
        self.assistant.is_configured()
    }

    /// Look up one code. Never fails: remote errors become `NotFound`
    /// carrying the error description.
    pub async fn translate(&self, request: &LookupRequest) -> LookupResult {
        let code = request.code.trim();
        if code.is_empty() {
            debug!("Empty code, skipping assistant call");
            return LookupResult::not_found();
        }

        info!(code, branch = ?request.branch, "Translating code");

        let reply = match self.assistant.submit(code).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Assistant call failed for {}: {}", code, e);
                return LookupResult::remote_failure(e.to_string());
            }
        };

        let result = self.policy.classify(&reply);
        debug!(found = result.is_found(), reply_chars = reply.chars().count(), "Classified reply");
        result
    }

    /// Run the lookup on its own task so a dropped client connection
    /// does not cancel the remote exchange halfway through.
    pub async fn lookup_detached(self: &Arc<Self>, request: LookupRequest) -> LookupResult {
        let gateway = Arc::clone(self);
        let span = tracing::info_span!("lookup", id = %Uuid::new_v4());

        let handle = tokio::spawn(async move { gateway.translate(&request).await }.instrument(span));
        match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Lookup task did not complete: {}", e);
                LookupResult::remote_failure(format!("lookup task failed: {}", e))
            }
        }
    }
}
