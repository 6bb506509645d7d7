use serde_json::Value;
use webhooks_contracts::UserInfo;

use crate::params::{display, ParamError, ParamsExt, SessionParameters};
use crate::validation::mask_email;

const TARGET_KEY: &str = "variavel_recebe_ultima_mensagem";

/// Stores the user's last message in the parameter named by
/// `variavel_recebe_ultima_mensagem`, without the angle brackets the ticketing system rejects.
pub fn capture_last_message(params: &mut SessionParameters, text: &str) -> Result<String, ParamError> {
    let target = match params.require(TARGET_KEY)? {
        Value::String(name) if !name.is_empty() => name.clone(),
        other => return Err(ParamError::invalid(TARGET_KEY, format!("not a parameter name: {other}"))),
    };
    let cleaned: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();
    params.set(&target, cleaned);
    ParamsExt::clear(params, TARGET_KEY);
    Ok(target)
}

pub fn reset_all(params: &mut SessionParameters) {
    for value in params.values_mut() {
        *value = Value::Null;
    }
}

pub fn bump_no_match(params: &mut SessionParameters) -> Result<(), ParamError> {
    const KEY: &str = "contador_no_match";
    let next = match params.get(KEY) {
        None => Value::from(1),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::from(i + 1),
            (None, Some(f)) => Value::from(f + 1.0),
            _ => return Err(ParamError::invalid(KEY, "not a counter")),
        },
        Some(other) => return Err(ParamError::invalid(KEY, format!("not a counter: {other}"))),
    };
    params.insert(KEY.to_string(), next);
    Ok(())
}

fn trimmed(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Email the user typed, normalised for comparison.
pub fn informed_email(params: &SessionParameters) -> String {
    params
        .get("usuario_email")
        .map(display)
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// The informed email is confirmed when it matches the registered one or nothing is
/// registered; otherwise the registered address is shown masked so the user can
/// recognise it. Registered name and phone are copied either way.
pub fn apply_registered_user(params: &mut SessionParameters, user: &UserInfo) {
    let registered_email = trimmed(user.email.as_deref()).to_lowercase();
    let name = trimmed(user.name.as_deref());
    let phone = trimmed(user.phones.first().and_then(|p| p.as_deref()));

    if registered_email.is_empty() || registered_email == informed_email(params) {
        confirm_email_unchecked(params);
    } else {
        params.set("usuario_email_confirmado", false);
        params.set("usuario_email_cadastrado", mask_email(&registered_email));
    }
    params.set("usuario_nome_cadastrado", name);
    params.set("usuario_telefone_cadastrado", phone);
}

/// Used when the registry cannot be reached: the flow goes on with the informed email.
pub fn confirm_email_unchecked(params: &mut SessionParameters) {
    params.set("usuario_email_confirmado", true);
    ParamsExt::clear(params, "usuario_email_cadastrado");
}
