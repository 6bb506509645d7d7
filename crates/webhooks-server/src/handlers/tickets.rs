use webhooks_contracts::{HandlerReply, SessionParameters, WebhookRequest};
use webhooks_kernel::tickets::{
    build_ticket, record_ticket_created, record_ticket_rejected, ServiceCode, TicketRejection,
};
use webhooks_kernel::{ParamError, ParamsExt};

use super::{silent, HandlerContext, HandlerError};
use crate::clients::ClientError;

const CODE_KEY: &str = "codigo_servico_1746";

/// `abrir_chamado_sgrc`. Ticketing refusals are recorded as outcomes; anything
/// that prevents building the ticket hands the conversation to a human agent.
pub(super) async fn open_ticket(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    if let Err(e) = submit(&mut params, ctx).await {
        tracing::warn!(error = %e, "ticket could not be built, escalating");
        params.set("encaminhar_transbordo_agora", true);
    }
    silent(params)
}

async fn submit(
    params: &mut SessionParameters,
    ctx: &HandlerContext<'_>,
) -> Result<(), HandlerError> {
    let raw = params.require(CODE_KEY)?;
    let code = ServiceCode::from_param(raw)
        .ok_or_else(|| ParamError::invalid(CODE_KEY, format!("no ticket service for {raw}")))?;
    let ticket = build_ticket(code, params, ctx.now)?;
    tracing::info!(service = code.label(), "opening ticket");

    match ctx.services.ticketing.new_ticket(&ticket).await {
        Ok(receipt) => {
            tracing::info!(protocol = %receipt.protocol_id, "ticket created");
            record_ticket_created(params, &receipt);
        }
        Err(ClientError::TicketRejected { kind, message }) => {
            tracing::warn!(?kind, %message, "ticket rejected");
            record_ticket_rejected(params, kind);
        }
        Err(e) => {
            tracing::error!(error = %e, "ticketing system unreachable");
            record_ticket_rejected(params, TicketRejection::Other);
        }
    }
    Ok(())
}
