use deunicode::deunicode;

use crate::params::{display, number, truthy, ParamError, ParamsExt, SessionParameters};

const SQUARE_WORDS: &[&str] = &["praça", "praca", "largo"];
const COMMUNITY_WORDS: &[&str] = &[
    "condominio",
    "vila",
    "loteamento",
    "comunidade",
    "conjunto habitacional",
];

fn folded(text: &str) -> String {
    deunicode(text).to_lowercase()
}

/// Flags squares and communities, which the lighting department handles differently.
pub fn check_special_address(params: &mut SessionParameters) -> Result<(), ParamError> {
    let street = folded(&params.require_text("logradouro_nome")?);
    let reference = params
        .truthy_text("logradouro_ponto_referencia")
        .map(|r| folded(&r))
        .unwrap_or_default();

    if SQUARE_WORDS.iter().any(|w| street.contains(w)) {
        params.set("logradouro_indicador_praca", true);
    }
    if COMMUNITY_WORDS
        .iter()
        .any(|w| street.contains(w) || reference.contains(w))
    {
        params.set("logradouro_indicador_comunidade", true);
    }
    params.set("reparo_luminaria_endereco_especial_executado", true);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spread {
    Block,
    Interleaved,
}

/// Maps the luminaire questionnaire (defect kind, one or a group, block or
/// interleaved) to the defect label the ticketing system expects.
pub fn classify_defect(params: &SessionParameters) -> Result<&'static str, ParamError> {
    const KEY: &str = "reparo_luminaria_defeito";
    let defect = params.require_number(KEY)?.trunc() as i64;
    let quantity = params
        .get("reparo_luminaria_quantidade")
        .filter(|v| !v.is_null())
        .map(display);
    let spread = params
        .get("reparo_luminaria_intercaladas_bloco")
        .filter(|v| truthy(v))
        .map(|v| {
            if number(v) == Some(1.0) {
                Spread::Block
            } else {
                Spread::Interleaved
            }
        });

    let label = match (defect, quantity.as_deref(), spread) {
        (1, Some("uma"), None) => "Apagada",
        (1, Some("grupo"), Some(Spread::Block)) => "Bloco ou grupo de luminárias apagadas",
        (1, Some("grupo"), Some(Spread::Interleaved)) => "Várias luminárias intercaladas apagadas",
        (2, Some("uma"), None) => "Piscando",
        (2, Some("grupo"), Some(_)) => "Bloco ou grupo de luminárias piscando",
        (3, Some("uma"), None) => "Acesa durante o dia",
        (3, Some("grupo"), Some(Spread::Block)) => "Bloco ou grupo de luminárias acesas de dia",
        (3, Some("grupo"), Some(Spread::Interleaved)) => {
            "Várias luminárias intercaladas acesas de dia"
        }
        (4, ..) => "Pendurada",
        (5, ..) => "Danificada",
        (6, ..) => "Com ruído",
        (defect, quantity, spread) => {
            return Err(ParamError::invalid(
                KEY,
                format!("no defect label for ({defect}, {quantity:?}, {spread:?})"),
            ))
        }
    };
    Ok(label)
}
