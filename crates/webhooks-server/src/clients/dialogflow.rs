use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use webhooks_config::Dialogflow;

use super::{status_error, ClientError, IntentDetector};

/// Dialogflow CX `detectIntent` over REST.
#[derive(Clone)]
pub struct DialogflowClient {
    http: Client,
    endpoint: String,
    agent_path: String,
    language_code: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    response_messages: Vec<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    #[serde(default)]
    text: Vec<String>,
}

/// Regional agents are served from `<location>-dialogflow.googleapis.com`.
fn api_endpoint(location_id: &str) -> String {
    if location_id == "global" {
        "dialogflow.googleapis.com".to_string()
    } else {
        format!("{location_id}-dialogflow.googleapis.com")
    }
}

fn agent_path(cfg: &Dialogflow) -> String {
    let base = format!(
        "projects/{}/locations/{}/agents/{}",
        cfg.project_id, cfg.location_id, cfg.agent_id
    );
    match cfg.environment_id.as_deref() {
        Some(env) if !env.is_empty() => format!("{base}/environments/{env}"),
        _ => base,
    }
}

/// One entry per text message; each message's fragments are joined with a space.
fn answer_texts(response: DetectIntentResponse) -> Vec<String> {
    response
        .query_result
        .response_messages
        .into_iter()
        .filter_map(|m| m.text)
        .map(|t| t.text.join(" "))
        .collect()
}

impl DialogflowClient {
    pub fn new(http: Client, cfg: &Dialogflow) -> Self {
        Self {
            http,
            endpoint: api_endpoint(&cfg.location_id),
            agent_path: agent_path(cfg),
            language_code: cfg.language_code.clone(),
            access_token: cfg.access_token.clone(),
        }
    }

    fn session_path(&self, session_id: &str) -> String {
        format!("{}/sessions/{session_id}", self.agent_path)
    }
}

#[async_trait]
impl IntentDetector for DialogflowClient {
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
        parameters: Option<Map<String, Value>>,
    ) -> Result<Vec<String>, ClientError> {
        let url = format!(
            "https://{}/v3/{}:detectIntent",
            self.endpoint,
            self.session_path(session_id)
        );
        let mut body = json!({
            "queryInput": {
                "text": {"text": text},
                "languageCode": self.language_code,
            }
        });
        if let Some(parameters) = parameters {
            body["queryParams"] = json!({ "parameters": parameters });
        }
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(answer_texts(response.json().await?))
    }
}
