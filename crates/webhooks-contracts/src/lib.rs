use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller id echoed back in every fulfillment payload unless configured otherwise.
pub const DEFAULT_TELEPHONY_CALLER_ID: &str = "+18558363987";

pub type SessionParameters = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub fulfillment_info: Option<FulfillmentInfo>,
    #[serde(default)]
    pub session_info: SessionInfo,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulfillmentInfo {
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub parameters: SessionParameters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub form_info: Option<FormInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    #[serde(default)]
    pub parameter_info: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_response: FulfillmentResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
    pub session_info: SessionInfoResponse,
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentResponse {
    pub messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    pub text: ResponseText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseText {
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfoResponse {
    pub parameters: SessionParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponsePayload {
    pub telephony: Telephony,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Telephony {
    pub caller_id: String,
}

/// What a tag handler hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerReply {
    Text(String),
    WithParameters(String, SessionParameters),
    WithForm(String, SessionParameters, Vec<Value>),
}

impl HandlerReply {
    pub fn into_response(self, caller_id: &str) -> WebhookResponse {
        let (text, parameters, form_parameters) = match self {
            HandlerReply::Text(text) => (text, Map::new(), Vec::new()),
            HandlerReply::WithParameters(text, parameters) => (text, parameters, Vec::new()),
            HandlerReply::WithForm(text, parameters, form) => (text, parameters, form),
        };
        WebhookResponse {
            fulfillment_response: FulfillmentResponse {
                messages: vec![ResponseMessage {
                    text: ResponseText { text: vec![text] },
                }],
            },
            page_info: if form_parameters.is_empty() {
                None
            } else {
                Some(PageInfo {
                    form_info: Some(FormInfo {
                        parameter_info: form_parameters,
                    }),
                })
            },
            session_info: SessionInfoResponse { parameters },
            payload: ResponsePayload {
                telephony: Telephony {
                    caller_id: caller_id.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub street_code: String,
    pub neighborhood: String,
    pub neighborhood_code: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    pub locality: String,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requester {
    pub email: String,
    pub cpf: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Phones>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phones {
    pub phone1: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTicket {
    pub classification_code: u32,
    pub description: String,
    pub address: Address,
    pub requester: Requester,
    #[serde(default)]
    pub specific_attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketReceipt {
    pub protocol_id: String,
    #[serde(default)]
    pub ticket_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phones: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Protocol {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub tickets: Vec<TicketSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketSummary {
    pub classification: Value,
    pub status: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressQuery {
    pub neighborhood_id: Option<String>,
    pub street_id: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub min_date: String,
}

/// Geocoder view of a free-text street reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeocodedAddress {
    pub formatted_address: String,
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub point_of_interest: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Street as registered in the city planning institute's street index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IppStreet {
    pub street_code: String,
    pub street_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IppNeighborhood {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreetCandidate {
    pub street_code: String,
    pub street_name: String,
    pub score: f64,
}

/// The debt API answers either with records or with `{"erro": ..., "motivos": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum PgmReply {
    Records(Value),
    Rejected { reasons: Value },
}

impl PgmReply {
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(ref map) if map.contains_key("erro") => PgmReply::Rejected {
                reasons: map.get("motivos").cloned().unwrap_or(Value::Null),
            },
            other => PgmReply::Records(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AscsacInput {
    pub message: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AscsacAnswer {
    pub answer_messages: Vec<String>,
    pub buttons: Vec<String>,
    pub files: Vec<ChatFile>,
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramInput {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramAnswer {
    pub answer_messages: Vec<String>,
}

/// Body of every non-2xx answer: `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}
