use webhooks_contracts::{HandlerReply, WebhookRequest};
use webhooks_kernel::{session, ParamError, ParamsExt};

use super::{silent, HandlerContext, HandlerError};

fn user_text(request: &WebhookRequest) -> Result<String, ParamError> {
    request
        .text
        .clone()
        .ok_or_else(|| ParamError::Missing("text".to_string()))
}

/// `ai`: free-text question forwarded to the assistant; its answer is the reply.
pub(super) async fn ai(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let question = user_text(&request)?;
    let answer = ctx.services.assistant.ask(&question).await?;
    tracing::info!(answer_len = answer.len(), "assistant answered");
    Ok(HandlerReply::Text(answer))
}

pub(super) fn capture_last_message(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let text = user_text(&request)?;
    let mut params = request.session_info.parameters;
    let target = session::capture_last_message(&mut params, &text)?;
    tracing::debug!(%target, "stored last user message");
    silent(params)
}

pub(super) fn reset_parameters(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    session::reset_all(&mut params);
    silent(params)
}

pub(super) fn identify_environment(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    params.set("ambiente", ctx.environment);
    silent(params)
}

pub(super) fn count_no_match(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    session::bump_no_match(&mut params)?;
    silent(params)
}
