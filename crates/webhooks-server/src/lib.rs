use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use chrono::{Local, Utc};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;
use webhooks_config::Config;
use webhooks_contracts::{
    AscsacAnswer, ErrorResponse, TelegramAnswer, WebhookRequest, WebhookResponse,
};

pub mod auth;
pub mod chat;
pub mod clients;
pub mod handlers;

use auth::TokenRegistry;
use chat::ChatBodyError;
use clients::Services;
use handlers::{dispatch, HandlerContext, Tag};

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn serve(cfg: Config) -> Result<(), String> {
    let addr: SocketAddr = cfg
        .server
        .listen_addr
        .parse()
        .map_err(|e| format!("invalid listen_addr: {e}"))?;

    let app = build_app(cfg).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bind failed: {e}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("serve failed: {e}"))
}

/// App wired to the real external services described in `cfg`.
pub async fn build_app(cfg: Config) -> Result<Router, String> {
    let services = Services::from_config(&cfg)?;
    build_app_with(cfg, services)
}

pub fn build_app_with(cfg: Config, services: Services) -> Result<Router, String> {
    let state = AppState::new(cfg, services)?;
    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route("/webhook", post(webhook))
        .route("/webhook/", post(webhook))
        .route("/chat/ascsac", post(ascsac))
        .route("/chat/ascsac/", post(ascsac))
        .route("/chat/telegram", post(telegram))
        .route("/chat/telegram/", post(telegram))
        .with_state(state))
}

#[derive(Clone)]
struct AppState {
    cfg: Arc<Config>,
    services: Services,
    tokens: Arc<TokenRegistry>,
}

impl AppState {
    fn new(cfg: Config, services: Services) -> Result<Self, String> {
        Ok(Self {
            tokens: Arc::new(TokenRegistry::from_config(&cfg.auth.tokens)?),
            services,
            cfg: Arc::new(cfg),
        })
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        match self.tokens.authorize(headers, Utc::now()) {
            Ok(username) => {
                tracing::debug!(%username, "authorized");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(reason = %e, "rejected credentials");
                Err(api_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string()))
            }
        }
    }

    async fn handle_webhook(&self, body: &[u8]) -> Result<WebhookResponse, ApiError> {
        let value: Value = std::str::from_utf8(body)
            .ok()
            .and_then(|text| serde_json::from_str(text).ok())
            .ok_or_else(|| {
                tracing::error!("body is not valid JSON");
                bad_request("invalid_request_body", "Invalid request body")
            })?;

        let Some(tag_name) = value
            .pointer("/fulfillmentInfo/tag")
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            tracing::error!("body does not contain a tag");
            return Err(bad_request("malformed_request", "Malformed request"));
        };
        tracing::Span::current().record("tag", tag_name.as_str());

        let Some(tag) = Tag::parse(&tag_name) else {
            tracing::error!(tag = %tag_name, "tag is not implemented");
            return Err(bad_request("invalid_tag", "Tag is invalid"));
        };

        let request: WebhookRequest = serde_json::from_value(value).map_err(|e| {
            tracing::error!(error = %e, "request does not match the fulfillment format");
            bad_request("malformed_request", "Malformed request")
        })?;

        let ctx = HandlerContext {
            services: &self.services,
            environment: &self.cfg.server.environment,
            street_similarity_threshold: self.cfg.integrations.ipp.street_similarity_threshold,
            now: Local::now().naive_local(),
        };
        tracing::info!("calling webhook function");
        let reply = dispatch(tag, request, &ctx).await.map_err(|e| {
            tracing::error!(error = %e, "handler failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "handler_error", e.to_string())
        })?;
        tracing::debug!(?reply, "webhook response");
        Ok(reply.into_response(&self.cfg.server.telephony_caller_id))
    }

    async fn handle_ascsac(&self, body: &[u8]) -> Result<AscsacAnswer, ApiError> {
        let value = chat::parse_body(body).map_err(chat_error)?;
        let input = chat::ascsac_input(&value).map_err(chat_error)?;
        let session_id = chat::ascsac_session_id(&input);
        tracing::info!(%session_id, message = %input.message, "ascsac message");

        let answers = self
            .services
            .intents
            .detect_intent(
                &session_id,
                &input.message,
                Some(chat::ascsac_parameters(&input)),
            )
            .await
            .map_err(detect_intent_error)?;
        tracing::info!(?answers, "agent answers");
        Ok(chat::classify_answers(&answers, &self.cfg.chat))
    }

    async fn handle_telegram(&self, body: &[u8]) -> Result<TelegramAnswer, ApiError> {
        let value = chat::parse_body(body).map_err(chat_error)?;
        let input = chat::telegram_input(&value).map_err(chat_error)?;
        let answer_messages = self
            .services
            .intents
            .detect_intent(&input.session_id, &input.message, None)
            .await
            .map_err(detect_intent_error)?;
        tracing::info!(answers = ?answer_messages, "agent answers");
        Ok(TelegramAnswer { answer_messages })
    }
}

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(code, message)))
}

fn bad_request(code: &str, message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, code, message)
}

fn chat_error(e: ChatBodyError) -> ApiError {
    tracing::error!(?e, "rejected chat body");
    bad_request(e.code(), e.message())
}

fn detect_intent_error(e: clients::ClientError) -> ApiError {
    tracing::error!(error = %e, "detect intent failed");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "detect_intent_failed",
        e.to_string(),
    )
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("webhook", %request_id, tag = tracing::field::Empty);
    async {
        state.authorize(&headers)?;
        state.handle_webhook(&body).await.map(Json)
    }
    .instrument(span)
    .await
}

async fn ascsac(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AscsacAnswer>, ApiError> {
    let request_id = Uuid::new_v4();
    async {
        state.authorize(&headers)?;
        state.handle_ascsac(&body).await.map(Json)
    }
    .instrument(tracing::info_span!("chat_ascsac", %request_id))
    .await
}

async fn telegram(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TelegramAnswer>, ApiError> {
    let request_id = Uuid::new_v4();
    async {
        state.authorize(&headers)?;
        state.handle_telegram(&body).await.map(Json)
    }
    .instrument(tracing::info_span!("chat_telegram", %request_id))
    .await
}
