use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::params::{display, number, truthy, ParamError, ParamsExt, SessionParameters};

pub const PROTESTS_ENDPOINT: &str = "v2/cdas/protestadas";
pub const TAXPAYER_DEBTS_ENDPOINT: &str = "v2/cdas/dividas-contribuinte";
pub const FULL_PAYMENT_ENDPOINT: &str = "v2/guiapagamento/emitir/avista";
pub const REGULARIZATION_ENDPOINT: &str = "v2/guiapagamento/emitir/regularizacao";
pub const REGISTRATION_ENDPOINT: &str = "v2/notificacao/atualizar";

pub const REGISTRATION_DATA_ERROR: &str = "Houve um erro na coleta de dados e não será possível realizar o seu cadastro no momento. Por favor, tente mais tarde.";

const ORIGIN_KEY: &str = "origem_solicitação";

#[derive(Debug, Error, PartialEq)]
pub enum DebtError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("debt api response is missing `{0}`")]
    MissingField(String),
}

/// Query kinds offered by the debt lookup flow, with the API field and the session
/// parameter holding the value.
const DEBT_QUERY_KINDS: &[(&str, &str, &str, &str)] = &[
    (
        "Inscrição Imobiliária",
        "inscricaoImobiliaria",
        "codigo_inscricao_imobiliaria",
        "Inscrição Imobiliária",
    ),
    (
        "Certidão da Dívida Ativa",
        "cda",
        "numero_certidao_divida_ativa",
        "Certidão de Dívida Ativa",
    ),
    ("CPF/CNPJ", "cpfCnpj", "cpf_cnpj_contribuinte", "CPF/CNPJ"),
    (
        "Execução Fiscal",
        "numeroExecucaoFiscal",
        "numero_execucao_fiscal",
        "Número de Execução Fiscal",
    ),
];

const INFRACTION_LABEL: &str = "Nº e Ano do Auto de Infração";

pub fn record_api_success(params: &mut SessionParameters) {
    params.set("api_resposta_sucesso", true);
}

pub fn record_api_rejection(params: &mut SessionParameters, reasons: Value) {
    params.set("api_resposta_sucesso", false);
    params.set("api_descricao_erro", reasons);
}

fn field<'a>(record: &'a Value, name: &str) -> Result<&'a Value, DebtError> {
    record
        .get(name)
        .ok_or_else(|| DebtError::MissingField(name.to_string()))
}

fn array<'a>(record: &'a Value, name: &str) -> Result<&'a Vec<Value>, DebtError> {
    field(record, name)?
        .as_array()
        .ok_or_else(|| DebtError::MissingField(name.to_string()))
}

/// Body for the protested-CDA lookup. Options 1, 2 and 3 search by property
/// registration, CDA number and CPF/CNPJ.
pub fn protest_query(params: &SessionParameters) -> Result<Value, DebtError> {
    let option = params.require_text("opcao_consulta_protesto")?;
    let api_field = match option.as_str() {
        "1" => "inscricaoImobiliaria",
        "2" => "cda",
        "3" => "cpfCnpj",
        other => {
            return Err(ParamError::invalid(
                "opcao_consulta_protesto",
                format!("unknown option `{other}`"),
            )
            .into())
        }
    };
    let mut body = Map::new();
    body.insert(ORIGIN_KEY.to_string(), json!(0));
    body.insert(
        api_field.to_string(),
        params.require("parametro_de_consulta")?.clone(),
    );
    Ok(Value::Object(body))
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null() && v.as_str() != Some(""))
}

pub fn protest_message(records: &Value) -> Result<String, DebtError> {
    let records = records
        .as_array()
        .ok_or_else(|| DebtError::MissingField("cdas".to_string()))?;
    let mut message = String::new();
    for (i, cda) in records.iter().enumerate() {
        let year_and_slip = match present(cda.get("numExercicio")) {
            Some(year) => {
                let combined = match present(cda.get("guia")) {
                    Some(slip) => format!("{}/{}", display(year), display(slip)),
                    None => display(year),
                };
                format!(" - exerc./guia {combined}")
            }
            None => String::new(),
        };
        message.push_str(&format!(
            "*{}. *\t*{}* (natureza {}{})",
            i + 1,
            display(field(cda, "cdaId")?),
            display(field(cda, "naturezaDivida")?),
            year_and_slip
        ));
        message.push_str(&format!(
            "\nFase de Cobrança: {}, Situação: {}, Saldo Total da Dívida: {}",
            display(field(cda, "faseCobranca")?),
            display(field(cda, "situacao")?),
            display(field(cda, "saldoTotal")?)
        ));
        if let Some(notary) = cda.get("numeroCartorio").filter(|v| truthy(v)) {
            message.push_str(&format!(
                "\nCartório {} - Protocolo nº {}",
                display(notary),
                cda.get("numeroProtocolo").map(display).unwrap_or_default()
            ));
        }
        if i + 1 < records.len() {
            message.push_str("\n\n");
        }
    }
    Ok(message)
}

/// Body for the taxpayer debt lookup. Anything other than the four listed kinds
/// searches by infraction notice number and year.
pub fn debt_query(params: &SessionParameters) -> Result<Value, DebtError> {
    let kind = params.require_text("da1_tipo_de_consulta")?;
    let mut body = Map::new();
    body.insert(ORIGIN_KEY.to_string(), json!(0));
    match DEBT_QUERY_KINDS.iter().find(|(k, ..)| *k == kind) {
        Some((_, api_field, param, _)) => {
            body.insert(api_field.to_string(), params.require(param)?.clone());
        }
        None => {
            body.insert(
                "anoAutoInfracao".to_string(),
                params.require("ano_auto_infracao")?.clone(),
            );
            body.insert(
                "numeroAutoInfracao".to_string(),
                params.require("numero_auto_infracao")?.clone(),
            );
        }
    }
    Ok(Value::Object(body))
}

/// Writes the numbered debt summary and the bookkeeping the payment flow relies on:
/// `dicionario_itens` maps each listed number to its CDA, EF or installment slip.
pub fn apply_debt_summary(params: &mut SessionParameters, records: &Value) -> Result<(), DebtError> {
    let kind = params.require_text("da1_tipo_de_consulta")?;
    let mut msg = match DEBT_QUERY_KINDS.iter().find(|(k, ..)| *k == kind) {
        Some((_, _, param, label)) => {
            format!("{label}: {}", display(params.require(param)?))
        }
        None => format!(
            "{INFRACTION_LABEL}: {} {}",
            display(params.require("numero_auto_infracao")?),
            display(params.require("ano_auto_infracao")?)
        ),
    };
    if kind == "Inscrição Imobiliária" {
        msg.push_str(&format!(
            "\nEndereço do Imóvel: {}",
            display(field(records, "enderecoImovel")?)
        ));
    }
    msg.push_str(&format!(
        "\nData de Vencimento: {}",
        display(field(records, "dataVencimento")?)
    ));

    let unsplit = field(records, "debitosNaoParceladosComSaldoTotal")?;
    let cdas = array(unsplit, "cdasNaoAjuizadasNaoParceladas")?;
    let efs = array(unsplit, "efsNaoParceladas")?;
    let slips = array(field(records, "guiasParceladasComSaldoTotal")?, "guiasParceladas")?;

    let mut index = 0usize;
    let mut items = Map::new();
    let mut cda_ids = Vec::new();
    let mut ef_ids = Vec::new();
    let mut slip_ids = Vec::new();

    if !cdas.is_empty() || !efs.is_empty() {
        msg.push_str(&format!(
            "\n\nDébitos não parcelados - Saldo Total da Dívida {}",
            display(field(unsplit, "saldoTotalNaoParcelado")?)
        ));
        if !cdas.is_empty() {
            msg.push_str("\n\nCDAs não parceladas");
            for cda in cdas {
                index += 1;
                let id = field(cda, "cdaId")?.clone();
                msg.push_str(&format!(
                    "\n*{index}.*\t*Certidão {}* - Saldo {}",
                    display(&id),
                    display(field(cda, "valorSaldoTotal")?)
                ));
                items.insert(index.to_string(), id.clone());
                cda_ids.push(id);
            }
        }
        if !efs.is_empty() {
            msg.push_str("\n\nEFs não parceladas");
            for ef in efs {
                index += 1;
                let id = field(ef, "numeroExecucaoFiscal")?.clone();
                msg.push_str(&format!(
                    "\n*{index}.*\t*Execução Fiscal {}* - Saldo {}",
                    display(&id),
                    display(field(ef, "saldoExecucaoFiscalNaoParcelada")?)
                ));
                items.insert(index.to_string(), id.clone());
                ef_ids.push(id);
            }
        }
    }
    if !slips.is_empty() {
        msg.push_str("\n\nGuias de parcelamento vigentes");
        for slip in slips {
            index += 1;
            let id = field(slip, "numero")?.clone();
            msg.push_str(&format!(
                "\n*{index}.*\t*Guia nº {}* - Data do Último Pagamento: {}",
                display(&id),
                display(field(slip, "dataUltimoPagamento")?)
            ));
            items.insert(index.to_string(), id.clone());
            slip_ids.push(id);
        }
    }

    let total_unsplit = cdas.len() + efs.len();
    let total_split = slips.len();
    params.set("dicionario_itens", items);
    params.set("total_itens_pagamento", index);
    params.set("mensagem_divida_contribuinte", msg);
    params.set("guias_quantidade_total", slip_ids.len());
    params.set("efs_cdas_quantidade_total", ef_ids.len() + cda_ids.len());
    params.set("lista_cdas", cda_ids);
    params.set("lista_efs", ef_ids);
    params.set("lista_guias", slip_ids);
    params.set("total_nao_parcelado", total_unsplit);
    params.set("total_parcelado", total_split);
    Ok(())
}

/// Item numbers the user picked from the debt summary, as `dicionario_itens` keys.
/// Returns `None` when a pick is not a number, or when "all items" is asked with a
/// total that is not a whole number within the listed items.
pub fn selected_items(params: &SessionParameters) -> Option<Vec<String>> {
    if params.is_set("todos_itens_informados") {
        let total = params.get("total_itens_pagamento").and_then(number)?;
        let listed = params.get("dicionario_itens")?.as_object()?.len();
        if total < 0.0 || total.fract() != 0.0 || total > listed as f64 {
            return None;
        }
        return Some((1..=total as usize).map(|i| i.to_string()).collect());
    }
    let as_key = |value: &Value| number(value).map(|n| format!("{}", n.trunc() as i64));
    match params.get("itens_informados")? {
        Value::Array(picks) => picks.iter().map(as_key).collect(),
        single => as_key(single).map(|key| vec![key]),
    }
}

fn listed(params: &SessionParameters, list: &str, id: &Value) -> bool {
    matches!(params.get(list), Some(Value::Array(ids)) if ids.contains(id))
}

/// Body for the full-payment slip: picked items split into CDAs and EFs.
/// `None` when a pick does not match a listed item.
pub fn full_payment_request(params: &SessionParameters, picks: &[String]) -> Option<Value> {
    let items = params.get("dicionario_itens")?.as_object()?;
    let mut cdas = Vec::new();
    let mut efs = Vec::new();
    for pick in picks {
        let id = items.get(pick)?;
        if listed(params, "lista_cdas", id) {
            cdas.push(id.clone());
        } else if listed(params, "lista_efs", id) {
            efs.push(id.clone());
        }
    }
    Some(json!({ ORIGIN_KEY: 0, "cdas": cdas, "efs": efs }))
}

/// Body for the regularization slip: only installment slips are sent.
pub fn regularization_request(params: &SessionParameters, picks: &[String]) -> Option<Value> {
    let items = params.get("dicionario_itens")?.as_object()?;
    let mut slips = Vec::new();
    for pick in picks {
        let id = items.get(pick)?;
        if listed(params, "lista_guias", id) {
            slips.push(id.clone());
        }
    }
    Some(json!({ ORIGIN_KEY: 0, "guias": slips }))
}

pub fn payment_slips_message(records: &Value) -> Result<String, DebtError> {
    let records = records
        .as_array()
        .ok_or_else(|| DebtError::MissingField("guias".to_string()))?;
    let parts = records
        .iter()
        .map(|slip| {
            Ok(format!(
                "Link: {}\nCódigo de barras: {}",
                display(field(slip, "pdf")?),
                display(field(slip, "codigoDeBarras")?)
            ))
        })
        .collect::<Result<Vec<_>, DebtError>>()?;
    Ok(parts.join("\n\n"))
}

pub fn registration_request(params: &SessionParameters) -> Result<Value, ParamError> {
    let cpf = params.require("usuario_cpf")?;
    let phone = params.require("usuario_telefone")?;
    let email = params.require("usuario_email")?;
    Ok(json!({
        "cpfCnpj": cpf,
        "celular": phone,
        "correioEletronico": email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> SessionParameters {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn protest_query_maps_option_to_field() {
        let p = params(json!({"opcao_consulta_protesto": "2", "parametro_de_consulta": "123"}));
        assert_eq!(
            protest_query(&p).unwrap(),
            json!({"origem_solicitação": 0, "cda": "123"})
        );
        let p = params(json!({"opcao_consulta_protesto": "9", "parametro_de_consulta": "1"}));
        assert!(protest_query(&p).is_err());
    }

    #[test]
    fn protest_message_lists_each_cda() {
        let records = json!([
            {"cdaId": "A1", "naturezaDivida": "IPTU", "numExercicio": "2020", "guia": "01",
             "faseCobranca": "Protesto", "situacao": "Ativa", "saldoTotal": "R$ 10,00",
             "numeroCartorio": "3", "numeroProtocolo": "99"},
            {"cdaId": "B2", "naturezaDivida": "ISS", "numExercicio": null,
             "faseCobranca": "Protesto", "situacao": "Ativa", "saldoTotal": "R$ 5,00"}
        ]);
        assert_eq!(
            protest_message(&records).unwrap(),
            "*1. *\t*A1* (natureza IPTU - exerc./guia 2020/01)\nFase de Cobrança: Protesto, Situação: Ativa, Saldo Total da Dívida: R$ 10,00\nCartório 3 - Protocolo nº 99\n\n*2. *\t*B2* (natureza ISS)\nFase de Cobrança: Protesto, Situação: Ativa, Saldo Total da Dívida: R$ 5,00"
        );
    }

    #[test]
    fn debt_query_falls_back_to_infraction_notice() {
        let p = params(json!({
            "da1_tipo_de_consulta": "Auto de Infração",
            "ano_auto_infracao": "2023",
            "numero_auto_infracao": "777"
        }));
        assert_eq!(
            debt_query(&p).unwrap(),
            json!({"origem_solicitação": 0, "anoAutoInfracao": "2023", "numeroAutoInfracao": "777"})
        );
    }

    #[test]
    fn debt_summary_numbers_items_across_sections() {
        let mut p = params(json!({
            "da1_tipo_de_consulta": "Inscrição Imobiliária",
            "codigo_inscricao_imobiliaria": "1234567"
        }));
        let records = json!({
            "enderecoImovel": "Rua A, 1",
            "dataVencimento": "10/10/2024",
            "debitosNaoParceladosComSaldoTotal": {
                "saldoTotalNaoParcelado": "R$ 300,00",
                "cdasNaoAjuizadasNaoParceladas": [{"cdaId": "C1", "valorSaldoTotal": "R$ 100,00"}],
                "efsNaoParceladas": [{"numeroExecucaoFiscal": "E1", "saldoExecucaoFiscalNaoParcelada": "R$ 200,00"}]
            },
            "guiasParceladasComSaldoTotal": {
                "guiasParceladas": [{"numero": "G1", "dataUltimoPagamento": "01/01/2024"}]
            }
        });
        apply_debt_summary(&mut p, &records).unwrap();
        assert_eq!(
            p["mensagem_divida_contribuinte"],
            "Inscrição Imobiliária: 1234567\nEndereço do Imóvel: Rua A, 1\nData de Vencimento: 10/10/2024\n\nDébitos não parcelados - Saldo Total da Dívida R$ 300,00\n\nCDAs não parceladas\n*1.*\t*Certidão C1* - Saldo R$ 100,00\n\nEFs não parceladas\n*2.*\t*Execução Fiscal E1* - Saldo R$ 200,00\n\nGuias de parcelamento vigentes\n*3.*\t*Guia nº G1* - Data do Último Pagamento: 01/01/2024"
        );
        assert_eq!(p["dicionario_itens"], json!({"1": "C1", "2": "E1", "3": "G1"}));
        assert_eq!(p["total_itens_pagamento"], json!(3));
        assert_eq!(p["efs_cdas_quantidade_total"], json!(2));
        assert_eq!(p["guias_quantidade_total"], json!(1));
        assert_eq!(p["total_nao_parcelado"], json!(2));
        assert_eq!(p["total_parcelado"], json!(1));
    }

    #[test]
    fn debt_summary_reports_missing_fields() {
        let mut p = params(json!({"da1_tipo_de_consulta": "CPF/CNPJ", "cpf_cnpj_contribuinte": "1"}));
        let err = apply_debt_summary(&mut p, &json!({})).unwrap_err();
        assert_eq!(err, DebtError::MissingField("dataVencimento".to_string()));
    }

    #[test]
    fn selections_accept_lists_scalars_and_all() {
        let p = params(json!({"itens_informados": [1.0, 3.0]}));
        assert_eq!(selected_items(&p).unwrap(), vec!["1", "3"]);
        let p = params(json!({"itens_informados": 12.0}));
        assert_eq!(selected_items(&p).unwrap(), vec!["12"]);
        let p = params(json!({
            "todos_itens_informados": true,
            "total_itens_pagamento": 2.0,
            "dicionario_itens": {"1": "A1", "2": "EF-9"}
        }));
        assert_eq!(selected_items(&p).unwrap(), vec!["1", "2"]);
        let p = params(json!({"itens_informados": ["x"]}));
        assert!(selected_items(&p).is_none());
    }

    #[test]
    fn all_items_total_must_fit_the_listed_items() {
        let items = json!({"1": "A1", "2": "EF-9"});
        for total in [json!(-1.0), json!(1.5), json!(3.0), json!(1e18)] {
            let p = params(json!({
                "todos_itens_informados": true,
                "total_itens_pagamento": total,
                "dicionario_itens": items
            }));
            assert!(selected_items(&p).is_none(), "total {total} accepted");
        }
        let p = params(json!({"todos_itens_informados": true, "total_itens_pagamento": 2.0}));
        assert!(selected_items(&p).is_none());
        let p = params(json!({
            "todos_itens_informados": true,
            "total_itens_pagamento": 0.0,
            "dicionario_itens": items
        }));
        assert_eq!(selected_items(&p).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn payment_requests_split_by_list() {
        let p = params(json!({
            "dicionario_itens": {"1": "C1", "2": "E1", "3": "G1"},
            "lista_cdas": ["C1"],
            "lista_efs": ["E1"],
            "lista_guias": ["G1"]
        }));
        let picks = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        assert_eq!(
            full_payment_request(&p, &picks).unwrap(),
            json!({"origem_solicitação": 0, "cdas": ["C1"], "efs": ["E1"]})
        );
        assert_eq!(
            regularization_request(&p, &picks).unwrap(),
            json!({"origem_solicitação": 0, "guias": ["G1"]})
        );
        assert!(full_payment_request(&p, &["9".to_string()]).is_none());
    }

    #[test]
    fn slips_message_joins_links() {
        let records = json!([
            {"pdf": "http://x/1.pdf", "codigoDeBarras": "111", "arquivoBase64": ""},
            {"pdf": "http://x/2.pdf", "codigoDeBarras": "222", "arquivoBase64": ""}
        ]);
        assert_eq!(
            payment_slips_message(&records).unwrap(),
            "Link: http://x/1.pdf\nCódigo de barras: 111\n\nLink: http://x/2.pdf\nCódigo de barras: 222"
        );
    }
}
