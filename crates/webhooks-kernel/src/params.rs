use serde_json::{Map, Value};
use thiserror::Error;

pub use webhooks_contracts::SessionParameters;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("missing session parameter `{0}`")]
    Missing(String),
    #[error("invalid session parameter `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

impl ParamError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ParamError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Truthiness as the conversation platform's authors use it: null, false, zero,
/// and empty strings/lists/objects are all "unset".
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Textual rendering used when a parameter is interpolated into a message.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads a number out of a parameter that may arrive as a JSON number or as text.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Integer rendering of a quantity, falling back to the raw text when it is not numeric.
pub fn quantity_label(value: &Value) -> String {
    match number(value) {
        Some(v) if v.is_finite() => format!("{}", v.trunc() as i64),
        _ => display(value),
    }
}

pub trait ParamsExt {
    fn require(&self, key: &str) -> Result<&Value, ParamError>;
    fn require_text(&self, key: &str) -> Result<String, ParamError>;
    fn require_number(&self, key: &str) -> Result<f64, ParamError>;
    fn is_set(&self, key: &str) -> bool;
    /// Parameter as text, or empty when absent or null.
    fn text_or_empty(&self, key: &str) -> String;
    /// Parameter as text only when it is truthy.
    fn truthy_text(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: impl Into<Value>);
    fn clear(&mut self, key: &str);
}

impl ParamsExt for Map<String, Value> {
    fn require(&self, key: &str) -> Result<&Value, ParamError> {
        self.get(key)
            .ok_or_else(|| ParamError::Missing(key.to_string()))
    }

    fn require_text(&self, key: &str) -> Result<String, ParamError> {
        self.require(key).map(display)
    }

    fn require_number(&self, key: &str) -> Result<f64, ParamError> {
        let value = self.require(key)?;
        number(value).ok_or_else(|| ParamError::invalid(key, format!("not a number: {value}")))
    }

    fn is_set(&self, key: &str) -> bool {
        self.get(key).map(truthy).unwrap_or(false)
    }

    fn text_or_empty(&self, key: &str) -> String {
        match self.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(v) => display(v),
        }
    }

    fn truthy_text(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| truthy(v)).map(display)
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.insert(key.to_string(), value.into());
    }

    fn clear(&mut self, key: &str) {
        self.insert(key.to_string(), Value::Null);
    }
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_platform_conventions() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!(1.0)));
        assert!(truthy(&json!({"original": "x"})));
    }

    #[test]
    fn display_keeps_float_suffix() {
        assert_eq!(display(&json!(123.0)), "123.0");
        assert_eq!(display(&json!(42)), "42");
        assert_eq!(display(&json!(null)), "None");
        assert_eq!(display(&json!("Rua A")), "Rua A");
    }

    #[test]
    fn quantity_label_truncates_numbers() {
        assert_eq!(quantity_label(&json!(3.0)), "3");
        assert_eq!(quantity_label(&json!("2.7")), "2");
        assert_eq!(quantity_label(&json!("muitos")), "muitos");
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("cama DE casal"), "Cama de casal");
        assert_eq!(capitalize("ármário"), "Ármário");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn require_reports_missing_key() {
        let params = Map::new();
        assert_eq!(
            params.require("usuario_cpf").unwrap_err(),
            ParamError::Missing("usuario_cpf".to_string())
        );
    }
}
