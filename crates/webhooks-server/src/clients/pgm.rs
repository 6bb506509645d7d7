use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use webhooks_config::Pgm;
use webhooks_contracts::PgmReply;

use super::{ClientError, DebtApi};

#[derive(Clone)]
pub struct PgmClient {
    http: Client,
    base_url: String,
    access_key: String,
}

impl PgmClient {
    pub fn new(http: Client, cfg: &Pgm) -> Self {
        Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            access_key: cfg.access_key.clone(),
        }
    }
}

/// Rejections arrive with a 4xx status and an `erro` body; those are answers, not
/// failures. Anything else that is not a success is an error.
fn reply(status: reqwest::StatusCode, body: &str) -> Result<PgmReply, ClientError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    match (status.is_success(), parsed) {
        (true, Some(body)) => Ok(PgmReply::from_body(body)),
        (true, None) => Err(ClientError::ResponseFormat(format!(
            "debt api returned non-JSON body: {body}"
        ))),
        (false, Some(body)) => match PgmReply::from_body(body) {
            rejected @ PgmReply::Rejected { .. } => Ok(rejected),
            PgmReply::Records(body) => Err(ClientError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            }),
        },
        (false, None) => Err(ClientError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

#[async_trait]
impl DebtApi for PgmClient {
    async fn call(&self, endpoint: &str, body: &Value) -> Result<PgmReply, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        tracing::debug!(%endpoint, "calling debt api");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        reply(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn rejection_with_client_status_is_a_reply() {
        let r = reply(
            StatusCode::BAD_REQUEST,
            r#"{"erro": true, "motivos": ["Inscrição não encontrada"]}"#,
        )
        .unwrap();
        assert_eq!(
            r,
            PgmReply::Rejected {
                reasons: json!(["Inscrição não encontrada"])
            }
        );
    }

    #[test]
    fn server_failure_is_an_error() {
        assert!(matches!(
            reply(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            Err(ClientError::Status { status: 500, .. })
        ));
        assert!(matches!(
            reply(StatusCode::OK, "<html>"),
            Err(ClientError::ResponseFormat(_))
        ));
    }
}
