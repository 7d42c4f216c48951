use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::assistant_interface::AssistantInterface;
use super::error::AssistantError;
use crate::config::AssistantConfig;

/// Client for the OpenAI Assistants (v2) API.
///
/// Every `submit` creates a fresh thread that is never reused.
pub struct OpenAIAssistant {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    assistant_id: Option<String>,
    organization_id: Option<String>,
    poll_interval: Duration,
    run_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunLastError>,
}

#[derive(Debug, Deserialize)]
struct RunLastError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAIAssistant {
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            "Initialized OpenAIAssistant: base_url={}, assistant_id={:?}",
            config.base_url, config.assistant_id
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            assistant_id: config.assistant_id.clone().filter(|id| !id.is_empty()),
            organization_id: config.organization_id.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            run_timeout_secs: config.run_timeout_secs,
        })
    }

    fn credentials(&self) -> Result<(&str, &str), AssistantError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AssistantError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;
        let assistant_id = self
            .assistant_id
            .as_deref()
            .ok_or_else(|| AssistantError::NotConfigured("ASSISTANT_ID is not set".to_string()))?;
        Ok((api_key, assistant_id))
    }

    fn authorized(&self, builder: RequestBuilder, api_key: &str) -> RequestBuilder {
        let builder = builder
            .bearer_auth(api_key)
            .header("OpenAI-Beta", "assistants=v2");
        match &self.organization_id {
            Some(org) => builder.header("OpenAI-Organization", org),
            None => builder,
        }
    }

    async fn create_thread(&self, api_key: &str) -> Result<ThreadObject, AssistantError> {
        let url = format!("{}/threads", self.base_url);
        let request = self.authorized(self.client.post(&url), api_key).json(&serde_json::json!({}));
        parse_response(request.send().await?).await
    }

    async fn add_message(&self, api_key: &str, thread_id: &str, code: &str) -> Result<(), AssistantError> {
        let url = format!("{}/threads/{}/messages", self.base_url, thread_id);
        let request = self.authorized(self.client.post(&url), api_key).json(&serde_json::json!({
            "role": "user",
            "content": code,
        }));
        parse_response::<serde_json::Value>(request.send().await?).await?;
        Ok(())
    }

    async fn create_run(
        &self,
        api_key: &str,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunObject, AssistantError> {
        let url = format!("{}/threads/{}/runs", self.base_url, thread_id);
        let request = self.authorized(self.client.post(&url), api_key).json(&serde_json::json!({
            "assistant_id": assistant_id,
        }));
        parse_response(request.send().await?).await
    }

    async fn get_run(&self, api_key: &str, thread_id: &str, run_id: &str) -> Result<RunObject, AssistantError> {
        let url = format!("{}/threads/{}/runs/{}", self.base_url, thread_id, run_id);
        let request = self.authorized(self.client.get(&url), api_key);
        parse_response(request.send().await?).await
    }

    /// Poll until the run reaches a terminal status.
    async fn wait_for_run(&self, api_key: &str, thread_id: &str, mut run: RunObject) -> Result<(), AssistantError> {
        loop {
            match run.status.as_str() {
                "completed" => return Ok(()),
                "queued" | "in_progress" | "cancelling" => {
                    debug!("Run {} is {}, polling again", run.id, run.status);
                    tokio::time::sleep(self.poll_interval).await;
                    run = self.get_run(api_key, thread_id, &run.id).await?;
                }
                _ => {
                    let message = run
                        .last_error
                        .map(|e| e.message)
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "no error details provided".to_string());
                    return Err(AssistantError::RunFailed {
                        status: run.status,
                        message,
                    });
                }
            }
        }
    }

    async fn latest_reply(&self, api_key: &str, thread_id: &str) -> Result<String, AssistantError> {
        let url = format!("{}/threads/{}/messages", self.base_url, thread_id);
        let request = self
            .authorized(self.client.get(&url), api_key)
            .query(&[("order", "desc"), ("limit", "1")]);
        let messages: MessageList = parse_response(request.send().await?).await?;

        let Some(latest) = messages.data.into_iter().next() else {
            return Ok(String::new());
        };

        match latest.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => Ok(text.value),
            Some(ContentBlock::Other) => Err(AssistantError::MalformedResponse(
                "latest message does not start with a text block".to_string(),
            )),
            None => Err(AssistantError::MalformedResponse(
                "latest message has no content".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AssistantInterface for OpenAIAssistant {
    async fn submit(&self, code: &str) -> Result<String, AssistantError> {
        let (api_key, assistant_id) = self.credentials()?;

        let thread = self.create_thread(api_key).await?;
        debug!("Created thread {}", thread.id);

        self.add_message(api_key, &thread.id, code).await?;

        let run = self.create_run(api_key, &thread.id, assistant_id).await?;
        debug!("Started run {} on thread {}", run.id, thread.id);

        tokio::time::timeout(
            Duration::from_secs(self.run_timeout_secs),
            self.wait_for_run(api_key, &thread.id, run),
        )
        .await
        .map_err(|_| AssistantError::Timeout(self.run_timeout_secs))??;

        self.latest_reply(api_key, &thread.id).await
    }

    fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, AssistantError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        let message = if message.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            message
        };
        return Err(AssistantError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| AssistantError::MalformedResponse(e.to_string()))
}
