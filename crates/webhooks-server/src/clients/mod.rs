use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use thiserror::Error;
use webhooks_config::Config;
use webhooks_contracts::{
    AddressQuery, GeocodedAddress, IppNeighborhood, IppStreet, NewTicket, PgmReply, Protocol,
    StreetCandidate, TicketReceipt, UserInfo,
};
use webhooks_kernel::tickets::TicketRejection;

pub mod chatbot_lab;
pub mod dialogflow;
pub mod google;
pub mod ipp;
pub mod pgm;
pub mod sgrc;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("not found")]
    NotFound,

    #[error("ticket rejected ({kind:?}): {message}")]
    TicketRejected {
        kind: TicketRejection,
        message: String,
    },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::ResponseFormat(e.to_string())
    }
}

/// City ticketing system (SGRC).
#[async_trait]
pub trait Ticketing: Send + Sync {
    async fn new_ticket(&self, ticket: &NewTicket) -> Result<TicketReceipt, ClientError>;

    /// `ClientError::NotFound` when no citizen is registered under `cpf`.
    async fn get_user_info(&self, cpf: &str) -> Result<UserInfo, ClientError>;

    async fn get_user_protocols(&self, person_id: &Value) -> Result<Vec<Protocol>, ClientError>;

    async fn get_address_protocols(
        &self,
        query: &AddressQuery,
    ) -> Result<Vec<Protocol>, ClientError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text address, `None` when nothing was found.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ClientError>;
}

/// Street and neighbourhood index kept by the city's planning institute (IPP).
#[async_trait]
pub trait StreetIndex: Send + Sync {
    async fn street_at(&self, latitude: f64, longitude: f64)
        -> Result<Option<IppStreet>, ClientError>;

    async fn neighborhood_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<IppNeighborhood>, ClientError>;

    async fn find_streets(
        &self,
        street_name: &str,
        number: Option<&str>,
    ) -> Result<Vec<StreetCandidate>, ClientError>;
}

/// Municipal attorney's office debt API (PGM).
#[async_trait]
pub trait DebtApi: Send + Sync {
    async fn call(&self, endpoint: &str, body: &Value) -> Result<PgmReply, ClientError>;
}

/// Question-answering service used for free-text questions.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, message: &str) -> Result<String, ClientError>;
}

/// Conversational agent that the chat channels relay to.
#[async_trait]
pub trait IntentDetector: Send + Sync {
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
        parameters: Option<Map<String, Value>>,
    ) -> Result<Vec<String>, ClientError>;
}

/// Every collaborator the handlers may reach. Tests swap in fakes field by field.
#[derive(Clone)]
pub struct Services {
    pub ticketing: Arc<dyn Ticketing>,
    pub geocoder: Arc<dyn Geocoder>,
    pub street_index: Arc<dyn StreetIndex>,
    pub debts: Arc<dyn DebtApi>,
    pub assistant: Arc<dyn Assistant>,
    pub intents: Arc<dyn IntentDetector>,
}

impl Services {
    pub fn from_config(cfg: &Config) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.integrations.timeout_ms))
            .build()
            .map_err(|e| format!("http client: {e}"))?;
        let integrations = &cfg.integrations;
        Ok(Self {
            ticketing: Arc::new(sgrc::SgrcClient::new(http.clone(), &integrations.sgrc)),
            geocoder: Arc::new(google::GoogleGeocoder::new(
                http.clone(),
                &integrations.google_maps,
            )),
            street_index: Arc::new(ipp::IppClient::new(http.clone(), &integrations.ipp)),
            debts: Arc::new(pgm::PgmClient::new(http.clone(), &integrations.pgm)),
            assistant: Arc::new(chatbot_lab::ChatbotLabClient::new(
                http.clone(),
                &integrations.chatbot_lab,
            )),
            intents: Arc::new(dialogflow::DialogflowClient::new(
                http,
                &integrations.dialogflow,
            )),
        })
    }
}

/// Reads the body of a non-success response into a `ClientError::Status`.
pub(crate) async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ClientError::Status { status, body }
}
