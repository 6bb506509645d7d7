use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use webhooks_config::Sgrc;
use webhooks_contracts::{AddressQuery, NewTicket, Protocol, TicketReceipt, UserInfo};
use webhooks_kernel::tickets::TicketRejection;

use super::{status_error, ClientError, Ticketing};

#[derive(Clone)]
pub struct SgrcClient {
    http: Client,
    base_url: String,
    authorization_header: String,
    body_token: String,
}

/// Error envelope returned by the ticketing gateway on refused tickets.
#[derive(Debug, Deserialize)]
struct Refusal {
    error: RefusalDetail,
}

#[derive(Debug, Deserialize)]
struct RefusalDetail {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

fn rejection_kind(kind: &str) -> TicketRejection {
    match kind {
        "business_rule" => TicketRejection::BusinessRule,
        "invalid_body" => TicketRejection::InvalidBody,
        "malformed_body" => TicketRejection::MalformedBody,
        "duplicate_ticket" => TicketRejection::DuplicateTicket,
        "equivalent_ticket" => TicketRejection::EquivalentTicket,
        "internal_error" => TicketRejection::InternalError,
        _ => TicketRejection::Other,
    }
}

/// Refusals the gateway could not classify still map to a ticket outcome: a
/// server-side failure counts as an internal ticketing error.
fn refusal(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<Refusal>(body) {
        Ok(refusal) => ClientError::TicketRejected {
            kind: rejection_kind(&refusal.error.kind),
            message: refusal.error.message,
        },
        Err(_) if status.is_server_error() => ClientError::TicketRejected {
            kind: TicketRejection::InternalError,
            message: body.to_string(),
        },
        Err(_) => ClientError::TicketRejected {
            kind: TicketRejection::Other,
            message: body.to_string(),
        },
    }
}

impl SgrcClient {
    pub fn new(http: Client, cfg: &Sgrc) -> Self {
        Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            authorization_header: cfg.authorization_header.clone(),
            body_token: cfg.body_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .header("Authorization", &self.authorization_header)
            .query(query)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: Value = response.json().await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl Ticketing for SgrcClient {
    async fn new_ticket(&self, ticket: &NewTicket) -> Result<TicketReceipt, ClientError> {
        tracing::info!(
            classification = ticket.classification_code,
            street = %ticket.address.street,
            "opening ticket"
        );
        let response = self
            .http
            .post(self.url("tickets"))
            .header("Authorization", &self.authorization_header)
            .json(&json!({ "token": self.body_token, "ticket": ticket }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(refusal(status, &body));
        }
        let body: Value = response.json().await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn get_user_info(&self, cpf: &str) -> Result<UserInfo, ClientError> {
        self.get_json("users", &[("cpf", cpf.to_string())]).await
    }

    async fn get_user_protocols(&self, person_id: &Value) -> Result<Vec<Protocol>, ClientError> {
        let id = match person_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.get_json(&format!("users/{id}/protocols"), &[]).await
    }

    async fn get_address_protocols(
        &self,
        query: &AddressQuery,
    ) -> Result<Vec<Protocol>, ClientError> {
        let mut params = vec![("min_date", query.min_date.clone())];
        let optional = [
            ("neighborhood_id", &query.neighborhood_id),
            ("street_id", &query.street_id),
            ("number", &query.number),
            ("complement", &query.complement),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                params.push((name, value.clone()));
            }
        }
        self.get_json("addresses/protocols", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classified_refusal_keeps_its_kind() {
        let err = refusal(
            StatusCode::CONFLICT,
            r#"{"error": {"type": "equivalent_ticket", "message": "já existe"}}"#,
        );
        match err {
            ClientError::TicketRejected { kind, message } => {
                assert_eq!(kind, TicketRejection::EquivalentTicket);
                assert_eq!(message, "já existe");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unclassified_server_failure_is_internal() {
        let err = refusal(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            ClientError::TicketRejected {
                kind: TicketRejection::InternalError,
                ..
            }
        ));
        let err = refusal(StatusCode::BAD_REQUEST, "nope");
        assert!(matches!(
            err,
            ClientError::TicketRejected {
                kind: TicketRejection::Other,
                ..
            }
        ));
    }
}
