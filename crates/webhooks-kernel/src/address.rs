use deunicode::deunicode;
use serde_json::Value;
use strsim::jaro;
use webhooks_contracts::{GeocodedAddress, IppNeighborhood, IppStreet, StreetCandidate};

use crate::params::{display, ParamError, ParamsExt, SessionParameters};
use crate::tickets::reference_point;

const CITY: &str = "Rio de Janeiro";

/// Clears the fields a new geocoding pass fills in and returns the geocoder query.
pub fn prepare_geocoding(params: &mut SessionParameters) -> Result<String, ParamError> {
    ParamsExt::clear(params, "logradouro_ponto_referencia_identificado");
    ParamsExt::clear(params, "logradouro_numero");
    ParamsExt::clear(params, "logradouro_ponto_referencia");
    let street = params.require_text("logradouro_nome")?;
    Ok(format!("{street}, {CITY} - RJ"))
}

/// Copies a geocoding result into the session. An address is only usable when it
/// names a street inside the city.
pub fn apply_geocoding(params: &mut SessionParameters, found: Option<&GeocodedAddress>) -> bool {
    let Some(found) = found else {
        return false;
    };
    let in_city = found.city.as_deref() == Some(CITY);
    let Some(street) = found.street_name.as_deref().filter(|s| !s.is_empty()) else {
        return false;
    };

    params.set("logradouro_nome", street);
    params.set("logradouro_numero", found.number.clone());
    params.set("logradouro_bairro", found.neighborhood.clone());
    params.set("logradouro_cidade", found.city.clone());
    params.set("logradouro_estado", found.state.clone());
    params.set("logradouro_cep", found.zip_code.clone());
    params.set("logradouro_latitude", found.latitude);
    params.set("logradouro_longitude", found.longitude);
    params.set(
        "logradouro_ponto_referencia_identificado",
        found.point_of_interest.clone(),
    );
    in_city
}

const STREET_TYPES: &[(&str, &str)] = &[
    ("r", "rua"),
    ("av", "avenida"),
    ("est", "estrada"),
    ("estr", "estrada"),
    ("tv", "travessa"),
    ("trav", "travessa"),
    ("pca", "praca"),
    ("pc", "praca"),
    ("al", "alameda"),
    ("lgo", "largo"),
    ("lg", "largo"),
    ("rod", "rodovia"),
    ("vd", "viaduto"),
    ("bc", "beco"),
    ("ld", "ladeira"),
];

/// Accent-free lowercase street name with abbreviated street types spelled out,
/// so "R. São Clemente" and "RUA SAO CLEMENTE" compare equal.
pub fn normalize_street(name: &str) -> String {
    let plain = deunicode(name).to_lowercase().replace(['.', ','], " ");
    let mut words = plain.split_whitespace();
    let mut out: Vec<&str> = Vec::new();
    if let Some(first) = words.next() {
        let expanded = STREET_TYPES
            .iter()
            .find(|(abbr, _)| *abbr == first)
            .map(|(_, full)| *full)
            .unwrap_or(first);
        out.push(expanded);
    }
    out.extend(words);
    out.join(" ")
}

pub fn street_similarity(a: &str, b: &str) -> f64 {
    jaro(&normalize_street(a), &normalize_street(b))
}

/// Picks the street index entry for the street the geocoder found. The entry at the
/// coordinates wins when its name is close enough; otherwise the closest candidate
/// from the address search above `threshold` is used.
pub fn reconcile_street(
    street_name: &str,
    at_point: Option<&IppStreet>,
    candidates: &[StreetCandidate],
    threshold: f64,
) -> Option<IppStreet> {
    if let Some(street) = at_point {
        if street_similarity(street_name, &street.street_name) >= threshold {
            return Some(street.clone());
        }
    }
    candidates
        .iter()
        .map(|c| (street_similarity(street_name, &c.street_name), c))
        .filter(|(similarity, _)| *similarity >= threshold)
        .max_by(|(sa, a), (sb, b)| sa.total_cmp(sb).then(a.score.total_cmp(&b.score)))
        .map(|(_, c)| IppStreet {
            street_code: c.street_code.clone(),
            street_name: c.street_name.clone(),
        })
}

pub fn apply_ipp(
    params: &mut SessionParameters,
    street: Option<&IppStreet>,
    neighborhood: Option<&IppNeighborhood>,
) {
    match street {
        Some(street) => {
            params.set("logradouro_id_ipp", street.street_code.clone());
            params.set("logradouro_nome_ipp", street.street_name.clone());
        }
        None => {
            params.set("logradouro_id_ipp", "");
            ParamsExt::clear(params, "logradouro_nome_ipp");
        }
    }
    match neighborhood {
        Some(n) => {
            params.set("logradouro_id_bairro_ipp", n.code.clone());
            params.set("logradouro_bairro_ipp", n.name.clone());
        }
        None => {
            ParamsExt::clear(params, "logradouro_id_bairro_ipp");
            ParamsExt::clear(params, "logradouro_bairro_ipp");
        }
    }
}

/// A ticket cannot be opened without a street code and a non-zero neighbourhood code.
pub fn ipp_identifiers_valid(params: &SessionParameters) -> bool {
    let street_ok = match params.get("logradouro_id_ipp") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    let neighborhood_ok = match params.get("logradouro_id_bairro_ipp") {
        None | Some(Value::Null) => false,
        Some(v) => display(v) != "0",
    };
    street_ok && neighborhood_ok
}

/// Integer part of a parameter rendered as text ("12.0" becomes "12"), or empty when unset.
pub fn integer_text(params: &SessionParameters, key: &str) -> String {
    match params.truthy_text(key) {
        Some(text) => text.split('.').next().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// Normalises the identifiers and writes `logradouro_mensagem_confirmacao`.
pub fn build_confirmation(params: &mut SessionParameters) {
    let number = integer_text(params, "logradouro_numero");
    let neighborhood_code = integer_text(params, "logradouro_id_bairro_ipp");
    params.set("logradouro_id_bairro_ipp", neighborhood_code);

    let reference = reference_point(params);
    let mut message = format!(
        "Logradouro: {} \n",
        params.get("logradouro_nome").map(display).unwrap_or_default()
    );
    if !number.is_empty() {
        message.push_str(&format!("Número:  {number}\n"));
    }
    if !reference.is_empty() {
        message.push_str(&format!("Ponto de referência:  {reference}\n"));
    }
    if let Some(neighborhood) = params.get("logradouro_bairro_ipp").filter(|v| !v.is_null()) {
        message.push_str(&format!("Bairro:  {}\n", display(neighborhood)));
    }
    if let Some(city) = params.get("logradouro_cidade") {
        message.push_str(&format!(
            "Cidade:  {}, {}\n",
            display(city),
            params.get("logradouro_estado").map(display).unwrap_or_default()
        ));
    }
    params.set("logradouro_mensagem_confirmacao", message);
}
