use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::params::{display, SessionParameters};

fn digits(text: &str) -> Vec<u32> {
    text.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        11 - rest
    }
}

/// Accepts formatted ("123.456.789-09") or bare CPF numbers.
pub fn is_valid_cpf(text: &str) -> bool {
    let d = digits(text);
    if d.len() != 11 || d.iter().all(|x| *x == d[0]) {
        return false;
    }
    let first = check_digit(&d[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&d[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
    d[9] == first && d[10] == second
}

pub fn is_valid_cnpj(text: &str) -> bool {
    let d = digits(text);
    if d.len() != 14 || d.iter().all(|x| *x == d[0]) {
        return false;
    }
    let first = check_digit(&d[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&d[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    d[12] == first && d[13] == second
}

pub fn is_valid_cpf_or_cnpj(text: &str) -> bool {
    match digits(text).len() {
        11 => is_valid_cpf(text),
        14 => is_valid_cnpj(text),
        _ => false,
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .unwrap_or_else(|e| panic!("email pattern must compile: {e}"))
    })
}

pub fn is_valid_email(text: &str) -> bool {
    email_regex().is_match(text.trim())
}

/// A full name needs at least two words made of letters (accents, apostrophes and hyphens allowed).
pub fn is_valid_name(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.len() >= 2
        && words.iter().all(|w| {
            w.chars().any(char::is_alphabetic)
                && w.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-' || c == '.')
        })
}

/// Hides most of the local part: `joao.silva@gmail.com` becomes `jo********@gmail.com`.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "*".repeat(email.chars().count());
    };
    let visible = if local.chars().count() > 3 { 2 } else { 1 };
    let shown: String = local.chars().take(visible).collect();
    let hidden = local.chars().count().saturating_sub(visible);
    format!("{shown}{}@{domain}", "*".repeat(hidden))
}

/// The registered name arrives either as plain text or as an entity with an `original` field.
pub fn registered_name(params: &SessionParameters) -> Option<String> {
    match params.get("usuario_nome_cadastrado")? {
        Value::Object(entity) => entity.get("original").map(display),
        Value::Null => None,
        other => Some(display(other)),
    }
}

pub fn validate_cpf_param(params: &SessionParameters) -> bool {
    params
        .get("usuario_cpf")
        .map(|v| is_valid_cpf(&display(v)))
        .unwrap_or(false)
}

pub fn validate_cpf_cnpj_param(params: &SessionParameters) -> bool {
    params
        .get("usuario_cpf_cnpj")
        .map(|v| is_valid_cpf_or_cnpj(&display(v)))
        .unwrap_or(false)
}

pub fn validate_email_param(params: &SessionParameters) -> bool {
    params
        .get("usuario_email")
        .map(|v| is_valid_email(&display(v)))
        .unwrap_or(false)
}

pub fn validate_name_param(params: &SessionParameters) -> bool {
    registered_name(params)
        .map(|name| is_valid_name(&name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cpf_check_digits() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("1234"));
    }

    #[test]
    fn cnpj_check_digits() {
        assert!(is_valid_cnpj("11.222.333/0001-81"));
        assert!(!is_valid_cnpj("11.222.333/0001-80"));
        assert!(is_valid_cpf_or_cnpj("11222333000181"));
        assert!(is_valid_cpf_or_cnpj("52998224725"));
        assert!(!is_valid_cpf_or_cnpj("123"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("maria.souza@prefeitura.rio"));
        assert!(is_valid_email(" joao@gmail.com "));
        assert!(!is_valid_email("joao@gmail"));
        assert!(!is_valid_email("joao gmail.com"));
    }

    #[test]
    fn names_need_two_words() {
        assert!(is_valid_name("Maria da Silva"));
        assert!(is_valid_name("João D'Ávila"));
        assert!(!is_valid_name("Maria"));
        assert!(!is_valid_name("avançar 123"));
    }

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("joao.silva@gmail.com"), "jo********@gmail.com");
        assert_eq!(mask_email("ana@rio.rj.gov.br"), "a**@rio.rj.gov.br");
    }

    #[test]
    fn registered_name_reads_entity_original() {
        let mut params = SessionParameters::new();
        params.insert(
            "usuario_nome_cadastrado".to_string(),
            json!({"original": "Carla Pereira", "name": "carla"}),
        );
        assert_eq!(registered_name(&params).as_deref(), Some("Carla Pereira"));
        assert!(validate_name_param(&params));
    }

    #[test]
    fn param_validators_default_to_false_when_absent() {
        let params = SessionParameters::new();
        assert!(!validate_cpf_param(&params));
        assert!(!validate_email_param(&params));
        assert!(!validate_cpf_cnpj_param(&params));
    }
}
