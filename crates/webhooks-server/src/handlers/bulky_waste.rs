use webhooks_contracts::{HandlerReply, SessionParameters, WebhookRequest};
use webhooks_kernel::bulky_waste;
use webhooks_kernel::eligibility::{address_query, evaluate, Eligibility};
use webhooks_kernel::params::truthy;
use webhooks_kernel::ParamsExt;

use super::{silent, HandlerContext, HandlerError};
use crate::clients::ClientError;

const REQUESTER_KEY: &str = "rebi_elegibilidade_abertura_chamado";
const ADDRESS_KEY: &str = "rebi_elegibilidade_endereco_abertura_chamado";

/// A requester unknown to the registry has no tickets and may always ask.
async fn requester_verdict(
    params: &SessionParameters,
    ctx: &HandlerContext<'_>,
) -> Result<Eligibility, HandlerError> {
    let cpf = params.require_text("usuario_cpf")?;
    let ticketing = &ctx.services.ticketing;
    let user = match ticketing.get_user_info(&cpf).await {
        Ok(user) => user,
        Err(ClientError::NotFound) => return Ok(Eligibility::Eligible),
        Err(e) => {
            tracing::warn!(error = %e, "registry lookup failed");
            return Ok(Eligibility::Unknown);
        }
    };
    let Some(person_id) = user.id.filter(truthy) else {
        return Ok(Eligibility::Eligible);
    };
    match ticketing.get_user_protocols(&person_id).await {
        Ok(protocols) => Ok(evaluate(&protocols, ctx.now.date())),
        Err(e) => {
            tracing::warn!(error = %e, %person_id, "protocol lookup failed");
            Ok(Eligibility::Unknown)
        }
    }
}

pub(super) async fn requester_eligibility(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let verdict = requester_verdict(&params, ctx).await?;
    tracing::info!(?verdict, "requester eligibility");
    verdict.record(&mut params, REQUESTER_KEY);
    silent(params)
}

pub(super) async fn address_eligibility(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let query = address_query(&params, ctx.now);
    let verdict = match ctx.services.ticketing.get_address_protocols(&query).await {
        Ok(protocols) => evaluate(&protocols, ctx.now.date()),
        Err(e) => {
            tracing::warn!(error = %e, "address protocol lookup failed");
            Eligibility::Unknown
        }
    };
    tracing::info!(?verdict, "address eligibility");
    verdict.record(&mut params, ADDRESS_KEY);
    silent(params)
}

pub(super) fn merge_items(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    bulky_waste::merge_items(&mut params)?;
    silent(params)
}

pub(super) fn evaluate_combinations(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    bulky_waste::evaluate_items(&mut params)?;
    silent(params)
}

pub(super) fn confirm_items(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    bulky_waste::confirm_items(&mut params)?;
    silent(params)
}

pub(super) fn define_texts(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    bulky_waste::define_collection_texts(&mut params);
    silent(params)
}

/// Asks which variant the user meant when the message names an ambiguous material.
pub(super) fn duplicate_item(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let text = request.text.unwrap_or_default();
    let message = bulky_waste::duplicate_item_hint(&text).unwrap_or_default();
    Ok(HandlerReply::WithParameters(
        message.to_string(),
        request.session_info.parameters,
    ))
}
