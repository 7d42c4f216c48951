use thiserror::Error;

/// Failures talking to the hosted assistant.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Assistant API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Assistant run ended with status '{status}': {message}")]
    RunFailed { status: String, message: String },

    #[error("Assistant run did not complete within {0}s")]
    Timeout(u64),

    #[error("Malformed assistant response: {0}")]
    MalformedResponse(String),
}
