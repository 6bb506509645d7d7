//! Tag handlers. Each one receives the fulfillment request, mutates its session
//! parameters and hands back the reply that goes into the response envelope.

use chrono::NaiveDateTime;
use thiserror::Error;
use webhooks_contracts::{HandlerReply, WebhookRequest};
use webhooks_kernel::debts::DebtError;
use webhooks_kernel::ParamError;

use crate::clients::{ClientError, Services};

mod address;
mod bulky_waste;
mod debts;
mod session;
mod tickets;
mod user;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Debt(#[from] DebtError),
    #[error("upstream call failed: {0}")]
    Client(#[from] ClientError),
}

/// What a handler may reach besides the request itself.
pub struct HandlerContext<'a> {
    pub services: &'a Services,
    pub environment: &'a str,
    pub street_similarity_threshold: f64,
    /// Local wall-clock time of the request.
    pub now: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Ai,
    OpenTicket,
    Locate,
    IdentifyIpp,
    ValidateCpf,
    ValidateCpfCnpj,
    ValidateEmail,
    ValidateName,
    ConfirmEmail,
    CaptureLastMessage,
    ResetParameters,
    IdentifyEnvironment,
    CountNoMatch,
    CheckSpecialAddress,
    ClassifyLightingDefect,
    DebtProtests,
    TaxpayerDebts,
    FullPaymentSlip,
    RegularizationSlip,
    DebtRegistration,
    BulkyWasteEligibility,
    BulkyWasteItemList,
    BulkyWasteCombinations,
    BulkyWasteConfirmItems,
    BulkyWasteTexts,
    BulkyWasteDuplicateItem,
    BulkyWasteAddressEligibility,
}

impl Tag {
    pub const ALL: [Tag; 27] = [
        Tag::Ai,
        Tag::OpenTicket,
        Tag::Locate,
        Tag::IdentifyIpp,
        Tag::ValidateCpf,
        Tag::ValidateCpfCnpj,
        Tag::ValidateEmail,
        Tag::ValidateName,
        Tag::ConfirmEmail,
        Tag::CaptureLastMessage,
        Tag::ResetParameters,
        Tag::IdentifyEnvironment,
        Tag::CountNoMatch,
        Tag::CheckSpecialAddress,
        Tag::ClassifyLightingDefect,
        Tag::DebtProtests,
        Tag::TaxpayerDebts,
        Tag::FullPaymentSlip,
        Tag::RegularizationSlip,
        Tag::DebtRegistration,
        Tag::BulkyWasteEligibility,
        Tag::BulkyWasteItemList,
        Tag::BulkyWasteCombinations,
        Tag::BulkyWasteConfirmItems,
        Tag::BulkyWasteTexts,
        Tag::BulkyWasteDuplicateItem,
        Tag::BulkyWasteAddressEligibility,
    ];

    /// Name the conversation designer puts in the fulfillment's tag field.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Ai => "ai",
            Tag::OpenTicket => "abrir_chamado_sgrc",
            Tag::Locate => "localizador",
            Tag::IdentifyIpp => "identificador_ipp",
            Tag::ValidateCpf => "validador_cpf",
            Tag::ValidateCpfCnpj => "validador_cpf_cnpj",
            Tag::ValidateEmail => "validador_email",
            Tag::ValidateName => "validador_nome",
            Tag::ConfirmEmail => "confirma_email",
            Tag::CaptureLastMessage => "define_variavel_ultima_mensagem",
            Tag::ResetParameters => "reseta_parametros",
            Tag::IdentifyEnvironment => "identifica_ambiente",
            Tag::CountNoMatch => "contador_no_match",
            Tag::CheckSpecialAddress => "checa_endereco_especial",
            Tag::ClassifyLightingDefect => "rlu_classifica_defeito",
            Tag::DebtProtests => "da_consulta_protestos",
            Tag::TaxpayerDebts => "da_consulta_debitos_contribuinte",
            Tag::FullPaymentSlip => "da_emitir_guia_pagamento_a_vista",
            Tag::RegularizationSlip => "da_emitir_guia_regularizacao",
            Tag::DebtRegistration => "da_cadastro",
            Tag::BulkyWasteEligibility => "rebi_elegibilidade_abertura_chamado",
            Tag::BulkyWasteItemList => "rebi_tratador_lista_itens",
            Tag::BulkyWasteCombinations => "rebi_avaliador_combinacoes_itens",
            Tag::BulkyWasteConfirmItems => "rebi_confirma_adicao_itens",
            Tag::BulkyWasteTexts => "rebi_define_texto",
            Tag::BulkyWasteDuplicateItem => "rebi_checa_item_duplicado",
            Tag::BulkyWasteAddressEligibility => "rebi_elegibilidade_endereco_abertura_chamado",
        }
    }

    pub fn parse(name: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

pub async fn dispatch(
    tag: Tag,
    request: WebhookRequest,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerReply, HandlerError> {
    match tag {
        Tag::Ai => session::ai(request, ctx).await,
        Tag::OpenTicket => tickets::open_ticket(request, ctx).await,
        Tag::Locate => address::locate(request, ctx).await,
        Tag::IdentifyIpp => address::identify_ipp(request, ctx).await,
        Tag::ValidateCpf => user::validate_cpf(request),
        Tag::ValidateCpfCnpj => user::validate_cpf_cnpj(request),
        Tag::ValidateEmail => user::validate_email(request),
        Tag::ValidateName => user::validate_name(request),
        Tag::ConfirmEmail => user::confirm_email(request, ctx).await,
        Tag::CaptureLastMessage => session::capture_last_message(request),
        Tag::ResetParameters => session::reset_parameters(request),
        Tag::IdentifyEnvironment => session::identify_environment(request, ctx),
        Tag::CountNoMatch => session::count_no_match(request),
        Tag::CheckSpecialAddress => address::check_special_address(request),
        Tag::ClassifyLightingDefect => address::classify_lighting_defect(request),
        Tag::DebtProtests => debts::protests(request, ctx).await,
        Tag::TaxpayerDebts => debts::taxpayer_debts(request, ctx).await,
        Tag::FullPaymentSlip => debts::full_payment_slip(request, ctx).await,
        Tag::RegularizationSlip => debts::regularization_slip(request, ctx).await,
        Tag::DebtRegistration => debts::registration(request, ctx).await,
        Tag::BulkyWasteEligibility => bulky_waste::requester_eligibility(request, ctx).await,
        Tag::BulkyWasteItemList => bulky_waste::merge_items(request),
        Tag::BulkyWasteCombinations => bulky_waste::evaluate_combinations(request),
        Tag::BulkyWasteConfirmItems => bulky_waste::confirm_items(request),
        Tag::BulkyWasteTexts => bulky_waste::define_texts(request),
        Tag::BulkyWasteDuplicateItem => bulky_waste::duplicate_item(request),
        Tag::BulkyWasteAddressEligibility => bulky_waste::address_eligibility(request, ctx).await,
    }
}

/// The common reply: no message, the mutated parameters.
fn silent(params: webhooks_contracts::SessionParameters) -> Result<HandlerReply, HandlerError> {
    Ok(HandlerReply::WithParameters(String::new(), params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_name() {
        for tag in Tag::ALL {
            assert_eq!(Tag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(Tag::parse("nao_existe"), None);
        assert_eq!(Tag::parse("AI"), None);
    }
}
