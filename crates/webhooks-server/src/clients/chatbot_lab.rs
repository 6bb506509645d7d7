use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use webhooks_config::ChatbotLab;

use super::{status_error, Assistant, ClientError};

#[derive(Clone)]
pub struct ChatbotLabClient {
    http: Client,
    url: String,
    api_key: String,
    chat_session_id: String,
    contexts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Answer {
    answer: String,
}

impl ChatbotLabClient {
    pub fn new(http: Client, cfg: &ChatbotLab) -> Self {
        Self {
            http,
            url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            chat_session_id: cfg.chat_session_id.clone(),
            contexts: cfg.contexts.clone(),
        }
    }
}

#[async_trait]
impl Assistant for ChatbotLabClient {
    async fn ask(&self, message: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "message": message,
                "chat_session_id": self.chat_session_id,
                "contexts": self.contexts,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            let err = status_error(response).await;
            tracing::error!(error = %err, "assistant backend error");
            return Err(err);
        }
        let answer: Answer = response.json().await?;
        Ok(answer.answer)
    }
}
