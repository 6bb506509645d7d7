use serde_json::Value;
use webhooks_contracts::{HandlerReply, PgmReply, SessionParameters, WebhookRequest};
use webhooks_kernel::debts::{
    apply_debt_summary, debt_query, full_payment_request, payment_slips_message, protest_message,
    protest_query, record_api_rejection, record_api_success, registration_request,
    regularization_request, selected_items, FULL_PAYMENT_ENDPOINT, PROTESTS_ENDPOINT,
    REGISTRATION_DATA_ERROR, REGISTRATION_ENDPOINT, REGULARIZATION_ENDPOINT,
    TAXPAYER_DEBTS_ENDPOINT,
};
use webhooks_kernel::ParamsExt;

use super::{silent, HandlerContext, HandlerError};

/// Calls the debt API and records the standard success flag. Returns the records
/// only when the API accepted the request.
async fn call_api(
    params: &mut SessionParameters,
    ctx: &HandlerContext<'_>,
    endpoint: &str,
    body: &Value,
) -> Result<Option<Value>, HandlerError> {
    match ctx.services.debts.call(endpoint, body).await? {
        PgmReply::Records(records) => {
            record_api_success(params);
            Ok(Some(records))
        }
        PgmReply::Rejected { reasons } => {
            tracing::info!(%endpoint, %reasons, "debt api rejected request");
            record_api_rejection(params, reasons);
            Ok(None)
        }
    }
}

pub(super) async fn protests(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let body = protest_query(&params)?;
    if let Some(records) = call_api(&mut params, ctx, PROTESTS_ENDPOINT, &body).await? {
        let message = protest_message(&records)?;
        params.set("mensagem_cda_protestadas", message);
    }
    silent(params)
}

pub(super) async fn taxpayer_debts(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let body = debt_query(&params)?;
    if let Some(records) = call_api(&mut params, ctx, TAXPAYER_DEBTS_ENDPOINT, &body).await? {
        apply_debt_summary(&mut params, &records)?;
    }
    silent(params)
}

async fn issue_slips(
    mut params: SessionParameters,
    ctx: &HandlerContext<'_>,
    endpoint: &str,
    build: fn(&SessionParameters, &[String]) -> Option<Value>,
) -> Result<HandlerReply, HandlerError> {
    let body = selected_items(&params).and_then(|picks| build(&params, &picks));
    let Some(body) = body else {
        tracing::info!("user picked items that are not on the list");
        params.set("da_1_opcao_informada_invalida", true);
        return silent(params);
    };
    let mut message = String::new();
    if let Some(records) = call_api(&mut params, ctx, endpoint, &body).await? {
        message = payment_slips_message(&records)?;
    }
    Ok(HandlerReply::WithParameters(message, params))
}

pub(super) async fn full_payment_slip(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    issue_slips(
        request.session_info.parameters,
        ctx,
        FULL_PAYMENT_ENDPOINT,
        full_payment_request,
    )
    .await
}

pub(super) async fn regularization_slip(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    issue_slips(
        request.session_info.parameters,
        ctx,
        REGULARIZATION_ENDPOINT,
        regularization_request,
    )
    .await
}

/// `da_cadastro`: registers the taxpayer's contact data for debt notices.
pub(super) async fn registration(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let body = match registration_request(&params) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "registration data incomplete");
            record_api_rejection(&mut params, Value::from(REGISTRATION_DATA_ERROR));
            return silent(params);
        }
    };
    if call_api(&mut params, ctx, REGISTRATION_ENDPOINT, &body)
        .await?
        .is_some()
    {
        tracing::info!("taxpayer registration updated");
    }
    silent(params)
}
