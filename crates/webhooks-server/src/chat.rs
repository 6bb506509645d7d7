//! Relay between the text channels (ASCSAC, Telegram) and the conversational agent.
//!
//! Agent answers may carry inline markers: a division signature splits one answer
//! into several messages, and a message starting with the button or file
//! signature is turned into buttons or an attachment instead of text.

use serde_json::{Map, Value};
use uuid::Uuid;
use webhooks_config::Chat;
use webhooks_contracts::{AscsacAnswer, AscsacInput, ChatFile, TelegramInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBodyError {
    InvalidBody,
    Malformed,
}

impl ChatBodyError {
    pub fn code(self) -> &'static str {
        match self {
            ChatBodyError::InvalidBody => "invalid_request_body",
            ChatBodyError::Malformed => "malformed_request",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ChatBodyError::InvalidBody => "Invalid request body",
            ChatBodyError::Malformed => "Malformed request",
        }
    }
}

/// Channels send raw line breaks inside JSON strings; they are flattened to spaces
/// before parsing.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ChatBodyError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ChatBodyError::InvalidBody)?;
    serde_json::from_str(&text.replace('\n', " ")).map_err(|_| ChatBodyError::InvalidBody)
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn ascsac_input(body: &Value) -> Result<AscsacInput, ChatBodyError> {
    Ok(AscsacInput {
        message: text_field(body, "message").ok_or(ChatBodyError::Malformed)?,
        cpf: text_field(body, "cpf"),
        email: text_field(body, "email"),
        phone: text_field(body, "phone"),
        protocol: text_field(body, "protocol"),
    })
}

pub fn telegram_input(body: &Value) -> Result<TelegramInput, ChatBodyError> {
    Ok(TelegramInput {
        message: text_field(body, "message").ok_or(ChatBodyError::Malformed)?,
        session_id: text_field(body, "session_id").ok_or(ChatBodyError::Malformed)?,
    })
}

/// Agent session for an ASCSAC user: the most specific identifier wins, and
/// anonymous users get a fresh session.
pub fn ascsac_session_id(input: &AscsacInput) -> String {
    let candidates = [
        ("protocol", &input.protocol),
        ("phone", &input.phone),
        ("cpf", &input.cpf),
        ("email", &input.email),
    ];
    candidates
        .into_iter()
        .find_map(|(prefix, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{prefix}-{v}"))
        })
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Session parameters sent along with every ASCSAC message.
pub fn ascsac_parameters(input: &AscsacInput) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert(
        "phone".to_string(),
        input.phone.clone().map(Value::from).unwrap_or(Value::Null),
    );
    parameters
}

/// Splits every answer on the division signature and sorts the pieces into
/// text, buttons and files, keeping their order of appearance in `order`.
/// Only the last button list is kept.
pub fn classify_answers(answers: &[String], signatures: &Chat) -> AscsacAnswer {
    let mut reply = AscsacAnswer::default();
    let segments = answers
        .iter()
        .flat_map(|answer| answer.split(signatures.division_signature.as_str()));
    for segment in segments {
        if let Some(options) = segment.strip_prefix(signatures.buttons_signature.as_str()) {
            reply.buttons = options.split(',').map(|o| o.trim().to_string()).collect();
            reply.order.push("button".to_string());
        } else if let Some(file) = segment.strip_prefix(signatures.file_signature.as_str()) {
            let file = file.trim();
            let (filename, content) = file.rsplit_once(':').unwrap_or(("", file));
            reply.files.push(ChatFile {
                filename: filename.trim().to_string(),
                content: content.trim().to_string(),
            });
            reply.order.push("file".to_string());
        } else {
            reply.answer_messages.push(segment.to_string());
            reply.order.push("text".to_string());
        }
    }
    reply
}
