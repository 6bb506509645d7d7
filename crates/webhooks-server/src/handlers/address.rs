use webhooks_contracts::{HandlerReply, SessionParameters, WebhookRequest};
use webhooks_kernel::address::{
    apply_geocoding, apply_ipp, build_confirmation, integer_text, ipp_identifiers_valid,
    prepare_geocoding, reconcile_street,
};
use webhooks_kernel::lighting;
use webhooks_kernel::ParamsExt;

use super::{silent, HandlerContext, HandlerError};

/// `localizador`: geocodes the street the user typed.
pub(super) async fn locate(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    match geocode(&mut params, ctx).await {
        Ok(valid) => params.set("logradouro_indicador_validade", valid),
        Err(e) => {
            tracing::warn!(error = %e, "geocoding failed, escalating");
            params.set("encaminhar_transbordo_agora", true);
        }
    }
    silent(params)
}

async fn geocode(
    params: &mut SessionParameters,
    ctx: &HandlerContext<'_>,
) -> Result<bool, HandlerError> {
    let query = prepare_geocoding(params)?;
    tracing::info!(%query, "geocoding address");
    let found = ctx.services.geocoder.geocode(&query).await?;
    Ok(apply_geocoding(params, found.as_ref()))
}

/// `identificador_ipp`: resolves the geocoded point to the city's street and
/// neighbourhood codes and builds the confirmation text.
pub(super) async fn identify_ipp(
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    if let Err(e) = lookup_street_index(&mut params, ctx).await {
        tracing::warn!(error = %e, "street index lookup failed");
        apply_ipp(&mut params, None, None);
    }
    if !ipp_identifiers_valid(&params) {
        params.set("logradouro_indicador_validade", false);
        return silent(params);
    }
    build_confirmation(&mut params);
    silent(params)
}

async fn lookup_street_index(
    params: &mut SessionParameters,
    ctx: &HandlerContext<'_>,
) -> Result<(), HandlerError> {
    let latitude = params.require_number("logradouro_latitude")?;
    let longitude = params.require_number("logradouro_longitude")?;
    let street_name = params.text_or_empty("logradouro_nome");
    let index = &ctx.services.street_index;
    let threshold = ctx.street_similarity_threshold;

    let at_point = index.street_at(latitude, longitude).await?;
    let neighborhood = index.neighborhood_at(latitude, longitude).await?;
    let mut street = reconcile_street(&street_name, at_point.as_ref(), &[], threshold);
    if street.is_none() {
        let number = integer_text(params, "logradouro_numero");
        let number = Some(number.as_str()).filter(|n| !n.is_empty());
        let candidates = index.find_streets(&street_name, number).await?;
        tracing::debug!(count = candidates.len(), "street candidates");
        street = reconcile_street(&street_name, None, &candidates, threshold);
    }
    apply_ipp(params, street.as_ref(), neighborhood.as_ref());
    Ok(())
}

pub(super) fn check_special_address(request: WebhookRequest) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    lighting::check_special_address(&mut params)?;
    silent(params)
}

pub(super) fn classify_lighting_defect(
    request: WebhookRequest,
) -> Result<HandlerReply, HandlerError> {
    let mut params = request.session_info.parameters;
    let label = lighting::classify_defect(&params)?;
    params.set("reparo_luminaria_defeito_classificado", label);
    silent(params)
}
