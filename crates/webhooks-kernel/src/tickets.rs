use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};
use webhooks_contracts::{Address, NewTicket, Phones, Requester, TicketReceipt};

use crate::params::{display, number, quantity_label, truthy, ParamError, ParamsExt, SessionParameters};
use crate::validation::{registered_name, validate_name_param};

/// Service codes of the city's 1746 catalogue that the bot can open tickets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCode {
    WasteRemoval,
    TreePruning,
    BusAirConditioning,
    StreetLightRepair,
    PotholeRepair,
    IrregularParking,
    TrafficLightOut,
    BulkyWasteRemoval,
}

impl ServiceCode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1647 => Some(ServiceCode::WasteRemoval),
            1614 => Some(ServiceCode::TreePruning),
            1464 => Some(ServiceCode::BusAirConditioning),
            152 => Some(ServiceCode::StreetLightRepair),
            182 => Some(ServiceCode::PotholeRepair),
            3581 => Some(ServiceCode::IrregularParking),
            3802 => Some(ServiceCode::TrafficLightOut),
            1607 => Some(ServiceCode::BulkyWasteRemoval),
            _ => None,
        }
    }

    /// `codigo_servico_1746` arrives as text or as a float from the agent.
    pub fn from_param(value: &Value) -> Option<Self> {
        let code = number(value)?;
        if code.fract() != 0.0 {
            return None;
        }
        Self::from_code(code as i64)
    }

    /// Classification sent to the ticketing system. Luminaire repair is filed under a
    /// different classification than the one users pick.
    pub fn classification(self) -> u32 {
        match self {
            ServiceCode::WasteRemoval => 1647,
            ServiceCode::TreePruning => 1614,
            ServiceCode::BusAirConditioning => 1464,
            ServiceCode::StreetLightRepair => 18131,
            ServiceCode::PotholeRepair => 182,
            ServiceCode::IrregularParking => 3581,
            ServiceCode::TrafficLightOut => 3802,
            ServiceCode::BulkyWasteRemoval => 1607,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceCode::WasteRemoval => "Remoção de Resíduo em Logradouro",
            ServiceCode::TreePruning => "Poda de Árvore em Logradouro",
            ServiceCode::BusAirConditioning => {
                "Verificação de Ar Condicionado Inoperante em Ônibus"
            }
            ServiceCode::StreetLightRepair => "Reparo de Luminária",
            ServiceCode::PotholeRepair => {
                "Reparo de Buraco, Deformamento ou Afundamento em Pista"
            }
            ServiceCode::IrregularParking => {
                "Fiscalização de estacionamento irregular de veículo"
            }
            ServiceCode::TrafficLightOut => "Reparo de sinal de trânsito apagado",
            ServiceCode::BulkyWasteRemoval => "Remoção de Entulho e Bens Inservíveis",
        }
    }
}

/// Ways the ticketing system can refuse a new ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketRejection {
    BusinessRule,
    InvalidBody,
    MalformedBody,
    DuplicateTicket,
    EquivalentTicket,
    InternalError,
    Other,
}

impl TicketRejection {
    pub fn outcome_code(self) -> &'static str {
        match self {
            TicketRejection::DuplicateTicket | TicketRejection::EquivalentTicket => {
                "erro_ticket_duplicado"
            }
            TicketRejection::InternalError => "erro_sgrc",
            TicketRejection::BusinessRule
            | TicketRejection::InvalidBody
            | TicketRejection::MalformedBody
            | TicketRejection::Other => "erro_interno",
        }
    }
}

pub fn record_ticket_created(params: &mut SessionParameters, receipt: &TicketReceipt) {
    params.set("solicitacao_protocolo", receipt.protocol_id.clone());
    params.set("solicitacao_criada", true);
    params.set("solicitacao_retorno", "sem_erro");
}

pub fn record_ticket_rejected(params: &mut SessionParameters, rejection: TicketRejection) {
    params.set("solicitacao_criada", false);
    params.set("solicitacao_retorno", rejection.outcome_code());
}

/// Email and CPF travel together: either both were collected or neither is sent.
/// The phone is sent whenever the registry lookup stored one, even when empty.
pub fn build_requester(params: &SessionParameters) -> Requester {
    let identified = params.contains_key("usuario_email") && params.contains_key("usuario_cpf");
    let name = if params.contains_key("usuario_nome_cadastrado") && validate_name_param(params) {
        registered_name(params).unwrap_or_default()
    } else {
        String::new()
    };
    Requester {
        email: if identified {
            params.text_or_empty("usuario_email")
        } else {
            String::new()
        },
        cpf: if identified {
            params.text_or_empty("usuario_cpf")
        } else {
            String::new()
        },
        name,
        phones: params
            .contains_key("usuario_telefone_cadastrado")
            .then(|| Phones {
                phone1: params.text_or_empty("usuario_telefone_cadastrado"),
            }),
    }
}

/// Digits of `logradouro_numero`, defaulting to "1" when the user gave none.
pub fn street_number(params: &SessionParameters) -> String {
    match params.get("logradouro_numero") {
        Some(value) if truthy(value) => match value {
            Value::Number(n) => n
                .as_f64()
                .map(|v| format!("{}", v.trunc() as i64))
                .unwrap_or_else(|| n.to_string()),
            other => display(other).chars().filter(char::is_ascii_digit).collect(),
        },
        _ => "1".to_string(),
    }
}

/// The reference point found by geocoding wins over the one the user typed.
pub fn reference_point(params: &SessionParameters) -> String {
    params
        .truthy_text("logradouro_ponto_referencia_identificado")
        .or_else(|| params.truthy_text("logradouro_ponto_referencia"))
        .unwrap_or_default()
}

pub fn street_address(params: &SessionParameters) -> Address {
    Address {
        street: params.text_or_empty("logradouro_nome"),
        street_code: params.text_or_empty("logradouro_id_ipp"),
        neighborhood: params.text_or_empty("logradouro_bairro_ipp"),
        neighborhood_code: params.text_or_empty("logradouro_id_bairro_ipp"),
        number: street_number(params),
        complement: String::new(),
        locality: reference_point(params),
        zip_code: params.truthy_text("logradouro_cep").unwrap_or_default(),
        address_type: None,
    }
}

/// Bus complaints are not tied to a street; tickets are filed at the operations centre.
pub fn operations_center_address() -> Address {
    Address {
        street: "Rua Ulysses Guimarães".to_string(),
        street_code: "211144".to_string(),
        neighborhood: "Cidade Nova".to_string(),
        neighborhood_code: "8".to_string(),
        number: "300".to_string(),
        complement: String::new(),
        locality: String::new(),
        zip_code: "20211-225".to_string(),
        address_type: None,
    }
}

const PARKING_OPTIONS: &[(&str, &str)] = &[
    ("Sobre a calçada", "402 - Sobre a calçada"),
    ("Em via pública", "403 - Em via pública"),
    ("Em frente a portão de garagem", "405 - Em frente a portão de garagem"),
    (
        "Em local com placa de proibido estacionar",
        "401 - Em local com placa de proibido estacionar",
    ),
    ("Em ponto de táxi", "411 - Em ponto de táxi"),
    (
        "Em vaga de portadores de necessidades especiais",
        "404 - Em vaga de portadores de necessidades especiais",
    ),
    ("Em local de carga e descarga", "406 - Em local de carga e descarga"),
    ("Em ciclovia", "417 - Em ciclovia"),
];

const TRAFFIC_LIGHT_LAMPS: &[(&str, &str)] = &[
    ("uma", "Uma lâmpada apenas"),
    ("duas", "Duas lâmpadas"),
    ("todas", "Todas as lâmpadas do sinal"),
];

fn lookup(table: &[(&str, &'static str)], key: &str, param: &str) -> Result<&'static str, ParamError> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| ParamError::invalid(param, format!("unknown option `{key}`")))
}

/// Builds the ticket for `code`. Luminaire tickets normalise `reparo_luminaria_localizacao`
/// in place, which is why the parameters are borrowed mutably.
pub fn build_ticket(
    code: ServiceCode,
    params: &mut SessionParameters,
    now: NaiveDateTime,
) -> Result<NewTicket, ParamError> {
    let requester = build_requester(params);
    let mut specific_attributes = Map::new();

    let (address, description) = match code {
        ServiceCode::WasteRemoval | ServiceCode::TreePruning => (
            street_address(params),
            params.require_text("servico_1746_descricao")?,
        ),
        ServiceCode::BusAirConditioning => {
            let occurred = occurrence_midpoint(
                params.require("ar_condicionado_inoperante_data_ocorrencia")?,
                now.date(),
            )?;
            specific_attributes.insert(
                "dataOcorrenc".to_string(),
                json!(occurred.format("%d/%m/%Y").to_string()),
            );
            specific_attributes.insert(
                "horOcorrenc".to_string(),
                json!(occurred.format("%H:%M:%S").to_string()),
            );
            specific_attributes.insert(
                "numelinhOnib".to_string(),
                params
                    .require("ar_condicionado_inoperante_numero_linha")?
                    .clone(),
            );
            specific_attributes.insert(
                "numCarro".to_string(),
                params
                    .get("ar_condicionado_inoperante_numero_onibus")
                    .cloned()
                    .unwrap_or(Value::Null),
            );
            (
                operations_center_address(),
                params.require_text("servico_1746_descricao")?,
            )
        }
        ServiceCode::StreetLightRepair => {
            let address = street_address(params);
            let location = params.require_text("reparo_luminaria_localizacao")?;
            let sports_court = params
                .get("reparo_luminaria_quadra_esportes")
                .and_then(number)
                == Some(1.0)
                || location == "Quadra de esportes";
            // The form shows "Quadra de esportes" to citizens; the ticketing API wants "Quadra".
            let location = if location == "Quadra de esportes" {
                params.set("reparo_luminaria_localizacao", "Quadra");
                "Quadra".to_string()
            } else {
                location
            };
            let in_square = params.is_set("logradouro_indicador_praca") || location == "Praça";
            specific_attributes.insert(
                "defeitoLuminaria".to_string(),
                params
                    .require("reparo_luminaria_defeito_classificado")?
                    .clone(),
            );
            specific_attributes.insert(
                "dentroQuadraEsporte".to_string(),
                json!(if sports_court { "1" } else { "0" }),
            );
            specific_attributes.insert(
                "estaNaPraca".to_string(),
                json!(if in_square { "1" } else { "0" }),
            );
            specific_attributes.insert("localizacaoLuminaria".to_string(), json!(location));
            specific_attributes.insert("nomePraca".to_string(), json!(""));
            (address, params.require_text("servico_1746_descricao")?)
        }
        ServiceCode::PotholeRepair => {
            specific_attributes.insert("riscoAcidente".to_string(), json!("Indefinido"));
            (
                street_address(params),
                params.require_text("servico_1746_descricao")?,
            )
        }
        ServiceCode::IrregularParking => {
            let place = params.require_text("estacionamento_irregular_local")?;
            let parking = lookup(PARKING_OPTIONS, &place, "estacionamento_irregular_local")?;
            specific_attributes.insert("tipoEstacionamento".to_string(), json!(parking));
            specific_attributes.insert(
                "placa".to_string(),
                params
                    .get("estacionamento_irregular_placa_veiculo")
                    .cloned()
                    .unwrap_or(Value::Null),
            );
            (
                street_address(params),
                params.require_text("servico_1746_descricao")?,
            )
        }
        ServiceCode::TrafficLightOut => {
            let lamps = params.require_text("rsta_quantidades_lampadas")?;
            let crossing = format!(
                "Rua 1: {}. Rua 2 ou Ponto de Referência: {}",
                text_or(params, "rsta_dados_cruzamento_1", "Não fica em cruzamento"),
                text_or(params, "rsta_dados_cruzamento_2", "Não fica em cruzamento"),
            );
            let lamps = lookup(TRAFFIC_LIGHT_LAMPS, &lamps, "rsta_quantidades_lampadas")?;
            specific_attributes.insert("quantasLampadasSinal".to_string(), json!(lamps));
            specific_attributes.insert("nomeViasCruzamento".to_string(), json!(crossing));
            specific_attributes.insert(
                "todoCruzamentoPiscando".to_string(),
                params
                    .get("rsta_cruzamento_piscando")
                    .cloned()
                    .unwrap_or_else(|| json!("0")),
            );
            (
                street_address(params),
                params.require_text("servico_1746_descricao")?,
            )
        }
        ServiceCode::BulkyWasteRemoval => {
            let mut address = street_address(params);
            address.complement = params.text_or_empty("endereco_complemento");
            address.address_type = Some(text_or(params, "endereco_tipo", "Casa"));
            (address, bulky_waste_description(params))
        }
    };

    Ok(NewTicket {
        classification_code: code.classification(),
        description,
        address,
        requester,
        specific_attributes,
    })
}

fn text_or(params: &SessionParameters, key: &str, default: &str) -> String {
    params
        .get(key)
        .map(display)
        .unwrap_or_else(|| default.to_string())
}

/// "MATERIAIS A REMOVER: geladeira - 1, entulho - 10. INFORMAÇÕES COMPLEMENTARES: ..."
pub fn bulky_waste_description(params: &SessionParameters) -> String {
    let names = list_param(params, "rebi_material_nome_informado");
    let quantities = list_param(params, "rebi_material_quantidade_informada");
    let items: Vec<String> = names
        .iter()
        .zip(quantities.iter())
        .map(|(item, qty)| format!("{} - {}", display(item), quantity_label(qty)))
        .collect();
    let mut description = format!("MATERIAIS A REMOVER: {}", items.join(", "));
    match params.truthy_text("rebi_informacoes_complementares") {
        Some(extra) => description.push_str(&format!(". INFORMAÇÕES COMPLEMENTARES: {extra}")),
        None => description.push('.'),
    }
    description
}

fn list_param(params: &SessionParameters, key: &str) -> Vec<Value> {
    match params.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Midpoint of the interval the agent extracted for when the problem happened.
///
/// The value may wrap the interval in `past`, and may carry either
/// `startDateTime`/`endDateTime`, `startDate`/`endDate`, or be a single date-time.
/// When no calendar date was captured the occurrence is assumed to be today.
pub fn occurrence_midpoint(value: &Value, today: NaiveDate) -> Result<NaiveDateTime, ParamError> {
    const KEY: &str = "ar_condicionado_inoperante_data_ocorrencia";
    let Value::Object(outer) = value else {
        return Err(ParamError::invalid(KEY, "expected a date object"));
    };
    let interval = match outer.get("past") {
        Some(Value::Object(past)) => past,
        _ => outer,
    };
    let (start, end) = match (
        interval.get("startDateTime"),
        interval.get("endDateTime"),
        interval.get("startDate"),
        interval.get("endDate"),
    ) {
        (Some(Value::Object(s)), Some(Value::Object(e)), _, _) => (s, e),
        (_, _, Some(Value::Object(s)), Some(Value::Object(e))) => (s, e),
        _ => (interval, interval),
    };

    let has_date = ["year", "month", "day"]
        .iter()
        .all(|k| start.contains_key(*k));
    let start = to_datetime(start, has_date, today)?;
    let end = to_datetime(end, has_date, today)?;
    Ok(start + (end - start) / 2)
}

fn to_datetime(
    fields: &Map<String, Value>,
    has_date: bool,
    today: NaiveDate,
) -> Result<NaiveDateTime, ParamError> {
    const KEY: &str = "ar_condicionado_inoperante_data_ocorrencia";
    let field = |name: &str, default: i64| -> i64 {
        fields
            .get(name)
            .and_then(number)
            .map(|v| v.trunc() as i64)
            .unwrap_or(default)
    };
    let (year, month, day) = if has_date {
        (field("year", 0), field("month", 0), field("day", 0))
    } else {
        (today.year() as i64, today.month() as i64, today.day() as i64)
    };
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|d| d.and_hms_opt(field("hours", 0) as u32, field("minutes", 0) as u32, field("seconds", 0) as u32))
        .ok_or_else(|| ParamError::invalid(KEY, format!("{year}-{month}-{day} is not a valid date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> SessionParameters {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn service_code_accepts_text_and_float() {
        assert_eq!(ServiceCode::from_param(&json!("1647")), Some(ServiceCode::WasteRemoval));
        assert_eq!(ServiceCode::from_param(&json!(152.0)), Some(ServiceCode::StreetLightRepair));
        assert_eq!(ServiceCode::from_param(&json!("9999")), None);
        assert_eq!(ServiceCode::StreetLightRepair.classification(), 18131);
    }

    #[test]
    fn requester_needs_both_email_and_cpf() {
        let only_email = params(json!({"usuario_email": "a@b.com"}));
        let requester = build_requester(&only_email);
        assert_eq!(requester.email, "");
        assert_eq!(requester.cpf, "");

        let both = params(json!({
            "usuario_email": "a@b.com",
            "usuario_cpf": "52998224725",
            "usuario_nome_cadastrado": {"original": "Ana Lima"},
            "usuario_telefone_cadastrado": "21999990000"
        }));
        let requester = build_requester(&both);
        assert_eq!(requester.email, "a@b.com");
        assert_eq!(requester.cpf, "52998224725");
        assert_eq!(requester.name, "Ana Lima");
        assert_eq!(requester.phones.unwrap().phone1, "21999990000");
    }

    #[test]
    fn registered_phone_is_sent_when_present_even_if_empty() {
        let p = params(json!({"usuario_telefone_cadastrado": ""}));
        assert_eq!(
            build_requester(&p).phones,
            Some(Phones {
                phone1: String::new()
            })
        );
        assert_eq!(build_requester(&params(json!({}))).phones, None);
    }

    #[test]
    fn invalid_registered_name_is_dropped() {
        let p = params(json!({"usuario_nome_cadastrado": "Ana"}));
        assert_eq!(build_requester(&p).name, "");
    }

    #[test]
    fn street_number_defaults_and_strips() {
        assert_eq!(street_number(&params(json!({}))), "1");
        assert_eq!(street_number(&params(json!({"logradouro_numero": null}))), "1");
        assert_eq!(street_number(&params(json!({"logradouro_numero": "nº 120A"}))), "120");
        assert_eq!(street_number(&params(json!({"logradouro_numero": 45.0}))), "45");
    }

    #[test]
    fn identified_reference_point_wins() {
        let p = params(json!({
            "logradouro_ponto_referencia_identificado": "Shopping",
            "logradouro_ponto_referencia": "perto da praça"
        }));
        assert_eq!(reference_point(&p), "Shopping");
        let p = params(json!({
            "logradouro_ponto_referencia_identificado": null,
            "logradouro_ponto_referencia": "perto da praça"
        }));
        assert_eq!(reference_point(&p), "perto da praça");
    }

    #[test]
    fn luminaire_ticket_rewrites_sports_court() {
        let mut p = params(json!({
            "logradouro_nome": "Rua do Catete",
            "logradouro_id_ipp": "12345",
            "logradouro_bairro_ipp": "Catete",
            "logradouro_id_bairro_ipp": "10",
            "reparo_luminaria_localizacao": "Quadra de esportes",
            "reparo_luminaria_defeito_classificado": "Apagada",
            "servico_1746_descricao": "Poste apagado"
        }));
        let ticket = build_ticket(ServiceCode::StreetLightRepair, &mut p, now()).unwrap();
        assert_eq!(ticket.classification_code, 18131);
        assert_eq!(ticket.specific_attributes["dentroQuadraEsporte"], "1");
        assert_eq!(ticket.specific_attributes["estaNaPraca"], "0");
        assert_eq!(ticket.specific_attributes["localizacaoLuminaria"], "Quadra");
        assert_eq!(p["reparo_luminaria_localizacao"], "Quadra");
        assert_eq!(ticket.address.street_code, "12345");
        assert_eq!(ticket.address.number, "1");
    }

    #[test]
    fn parking_ticket_rejects_unknown_place() {
        let mut p = params(json!({
            "estacionamento_irregular_local": "Na lua",
            "servico_1746_descricao": "x"
        }));
        let err = build_ticket(ServiceCode::IrregularParking, &mut p, now()).unwrap_err();
        assert!(matches!(err, ParamError::Invalid { .. }));

        let mut p = params(json!({
            "estacionamento_irregular_local": "Em ciclovia",
            "servico_1746_descricao": "x"
        }));
        let ticket = build_ticket(ServiceCode::IrregularParking, &mut p, now()).unwrap();
        assert_eq!(ticket.specific_attributes["tipoEstacionamento"], "417 - Em ciclovia");
        assert_eq!(ticket.specific_attributes["placa"], Value::Null);
    }

    #[test]
    fn traffic_light_ticket_describes_crossing() {
        let mut p = params(json!({
            "rsta_quantidades_lampadas": "todas",
            "rsta_dados_cruzamento_1": "Rua A",
            "servico_1746_descricao": "sinal apagado"
        }));
        let ticket = build_ticket(ServiceCode::TrafficLightOut, &mut p, now()).unwrap();
        assert_eq!(
            ticket.specific_attributes["nomeViasCruzamento"],
            "Rua 1: Rua A. Rua 2 ou Ponto de Referência: Não fica em cruzamento"
        );
        assert_eq!(
            ticket.specific_attributes["quantasLampadasSinal"],
            "Todas as lâmpadas do sinal"
        );
        assert_eq!(ticket.specific_attributes["todoCruzamentoPiscando"], "0");
    }

    #[test]
    fn bulky_waste_ticket_lists_materials() {
        let mut p = params(json!({
            "rebi_material_nome_informado": ["geladeira", "entulho"],
            "rebi_material_quantidade_informada": [1.0, 10.0],
            "rebi_informacoes_complementares": "portão azul",
            "endereco_complemento": "casa 2"
        }));
        let ticket = build_ticket(ServiceCode::BulkyWasteRemoval, &mut p, now()).unwrap();
        assert_eq!(
            ticket.description,
            "MATERIAIS A REMOVER: geladeira - 1, entulho - 10. INFORMAÇÕES COMPLEMENTARES: portão azul"
        );
        assert_eq!(ticket.address.complement, "casa 2");
        assert_eq!(ticket.address.address_type.as_deref(), Some("Casa"));
    }

    #[test]
    fn occurrence_midpoint_of_past_interval() {
        let value = json!({"past": {
            "startDateTime": {"year": 2024.0, "month": 3.0, "day": 10.0, "hours": 8.0},
            "endDateTime": {"year": 2024.0, "month": 3.0, "day": 10.0, "hours": 10.0}
        }});
        let mid = occurrence_midpoint(&value, now().date()).unwrap();
        assert_eq!(mid.format("%d/%m/%Y %H:%M:%S").to_string(), "10/03/2024 09:00:00");
    }

    #[test]
    fn occurrence_without_date_uses_today() {
        let value = json!({"hours": 14.0, "minutes": 30.0});
        let mid = occurrence_midpoint(&value, now().date()).unwrap();
        assert_eq!(mid.format("%d/%m/%Y %H:%M:%S").to_string(), "15/03/2024 14:30:00");
    }

    #[test]
    fn bus_ticket_uses_operations_center() {
        let mut p = params(json!({
            "ar_condicionado_inoperante_data_ocorrencia": {"startDate": {"year": 2024, "month": 3, "day": 1}, "endDate": {"year": 2024, "month": 3, "day": 3}},
            "ar_condicionado_inoperante_numero_linha": "474",
            "servico_1746_descricao": "ar quebrado"
        }));
        let ticket = build_ticket(ServiceCode::BusAirConditioning, &mut p, now()).unwrap();
        assert_eq!(ticket.address.street_code, "211144");
        assert_eq!(ticket.specific_attributes["dataOcorrenc"], "02/03/2024");
        assert_eq!(ticket.specific_attributes["horOcorrenc"], "00:00:00");
        assert_eq!(ticket.specific_attributes["numCarro"], Value::Null);
    }

    #[test]
    fn rejection_outcome_codes() {
        assert_eq!(TicketRejection::EquivalentTicket.outcome_code(), "erro_ticket_duplicado");
        assert_eq!(TicketRejection::InternalError.outcome_code(), "erro_sgrc");
        assert_eq!(TicketRejection::BusinessRule.outcome_code(), "erro_interno");
    }
}
