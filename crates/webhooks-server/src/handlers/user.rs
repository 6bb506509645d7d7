use webhooks_contracts::{HandlerReply, SessionParameters, WebhookRequest};
use webhooks_kernel::session::{apply_registered_user, confirm_email_unchecked};
use webhooks_kernel::validation::{
    validate_cpf_cnpj_param, validate_cpf_param, validate_email_param, validate_name_param,
};
use webhooks_kernel::ParamsExt;

use super::{silent, HandlerContext, HandlerError};

/// Writes the verdict under `<param>_valido`.
fn validated(
    request: WebhookRequest,
    param: &str,
    check: fn(&SessionParameters) -> bool,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let valid = check(&params);
    tracing::debug!(%param, valid, "validated parameter");
    params.set(&format!("{param}_valido"), valid);
    silent(params)
}

pub(super) fn validate_cpf(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    validated(request, "usuario_cpf", validate_cpf_param)
}

pub(super) fn validate_cpf_cnpj(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    validated(request, "usuario_cpf_cnpj", validate_cpf_cnpj_param)
}

pub(super) fn validate_email(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    validated(request, "usuario_email", validate_email_param)
}

pub(super) fn validate_name(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    validated(request, "usuario_nome", validate_name_param)
}

/// `confirma_email`: checks the informed email against the ticketing registry.
pub(super) async fn confirm_email(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let cpf = params.require_text("usuario_cpf")?;
    match ctx.services.ticketing.get_user_info(&cpf).await {
        Ok(user) => apply_registered_user(&mut params, &user),
        Err(e) => {
            tracing::warn!(error = %e, "registry lookup failed, keeping informed email");
            confirm_email_unchecked(&mut params);
        }
    }
    silent(params)
}
