use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config failed: {0}")]
    Read(String),
    #[error("parse config failed: {0}")]
    Parse(String),
    #[error("schema load failed: {0}")]
    SchemaLoad(String),
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),
    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: Server,
    pub auth: Auth,
    pub integrations: Integrations,
    #[serde(default)]
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub listen_addr: String,
    pub environment: String,
    #[serde(default = "default_telephony_caller_id")]
    pub telephony_caller_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    pub tokens: Vec<ApiToken>,
}

/// A bearer token accepted by the API, stored as the hex SHA-256 of the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub username: String,
    pub token_sha256: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrations {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub sgrc: Sgrc,
    pub google_maps: GoogleMaps,
    #[serde(default)]
    pub ipp: Ipp,
    pub pgm: Pgm,
    pub chatbot_lab: ChatbotLab,
    pub dialogflow: Dialogflow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sgrc {
    pub url: String,
    #[serde(default)]
    pub authorization_header: String,
    #[serde(default)]
    pub body_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleMaps {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipp {
    #[serde(default = "default_ipp_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_ipp_neighborhood_url")]
    pub neighborhood_url: String,
    #[serde(default = "default_street_similarity_threshold")]
    pub street_similarity_threshold: f64,
}

impl Default for Ipp {
    fn default() -> Self {
        Self {
            geocode_url: default_ipp_geocode_url(),
            neighborhood_url: default_ipp_neighborhood_url(),
            street_similarity_threshold: default_street_similarity_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pgm {
    pub api_url: String,
    #[serde(default)]
    pub access_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotLab {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_session_id")]
    pub chat_session_id: String,
    #[serde(default = "default_chatbot_lab_contexts")]
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialogflow {
    pub project_id: String,
    pub location_id: String,
    pub agent_id: String,
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default = "default_buttons_signature")]
    pub buttons_signature: String,
    #[serde(default = "default_file_signature")]
    pub file_signature: String,
    #[serde(default = "default_division_signature")]
    pub division_signature: String,
}

impl Default for Chat {
    fn default() -> Self {
        Self {
            buttons_signature: default_buttons_signature(),
            file_signature: default_file_signature(),
            division_signature: default_division_signature(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_telephony_caller_id() -> String {
    "+18558363987".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_ipp_geocode_url() -> String {
    "https://pgeo3.rio.rj.gov.br/arcgis/rest/services/Geocode/Geocode_Logradouros_WGS84/GeocodeServer"
        .to_string()
}

fn default_ipp_neighborhood_url() -> String {
    "https://pgeo3.rio.rj.gov.br/arcgis/rest/services/Cartografia/Limites_administrativos/MapServer/4/query"
        .to_string()
}

fn default_street_similarity_threshold() -> f64 {
    0.8
}

fn default_chat_session_id() -> String {
    "e23bdc43-bb26-4273-a187-e3e23836e0c2".to_string()
}

fn default_chatbot_lab_contexts() -> Vec<String> {
    vec!["cariocadigital".to_string()]
}

fn default_language_code() -> String {
    "pt-br".to_string()
}

fn default_buttons_signature() -> String {
    "BUTTONOPTIONS:".to_string()
}

fn default_file_signature() -> String {
    "FILE:".to_string()
}

fn default_division_signature() -> String {
    "SIGNATURE_TYPE_DIVISION_MESSAGE".to_string()
}

/// Environment variables that replace secrets read from the YAML file.
const SECRET_OVERRIDES: &[&str] = &[
    "SGRC_AUTHORIZATION_HEADER",
    "SGRC_BODY_TOKEN",
    "GMAPS_API_TOKEN",
    "CHATBOT_PGM_ACCESS_KEY",
    "CHATBOT_LAB_API_KEY",
    "DIALOGFLOW_ACCESS_TOKEN",
];

pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config_text =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&config_text).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let instance = serde_json::to_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_against_schema(&instance)?;

    let mut cfg: Config =
        serde_json::from_value(instance).map_err(|e| ConfigError::Parse(e.to_string()))?;
    apply_secret_overrides(&mut cfg, |key| std::env::var(key).ok());
    validate_runtime_support(&cfg)?;
    Ok(cfg)
}

fn validate_against_schema(instance: &serde_json::Value) -> Result<(), ConfigError> {
    let schema_path = [
        std::path::PathBuf::from("config/config.schema.json"),
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join("config/config.schema.json"),
    ]
    .into_iter()
    .find(|p| p.exists())
    .ok_or_else(|| {
        ConfigError::SchemaLoad(
            "config schema not found at config/config.schema.json or workspace config path"
                .to_string(),
        )
    })?;

    let schema_text =
        std::fs::read_to_string(schema_path).map_err(|e| ConfigError::SchemaLoad(e.to_string()))?;
    let schema: serde_json::Value =
        serde_json::from_str(&schema_text).map_err(|e| ConfigError::SchemaLoad(e.to_string()))?;

    let validator =
        jsonschema::validator_for(&schema).map_err(|e| ConfigError::SchemaLoad(e.to_string()))?;
    if let Err(first) = validator.validate(instance) {
        return Err(ConfigError::SchemaValidation(first.to_string()));
    }
    Ok(())
}

pub fn apply_secret_overrides<F>(cfg: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for key in SECRET_OVERRIDES {
        let Some(value) = lookup(key).filter(|v| !v.is_empty()) else {
            continue;
        };
        let slot = match *key {
            "SGRC_AUTHORIZATION_HEADER" => &mut cfg.integrations.sgrc.authorization_header,
            "SGRC_BODY_TOKEN" => &mut cfg.integrations.sgrc.body_token,
            "GMAPS_API_TOKEN" => &mut cfg.integrations.google_maps.api_token,
            "CHATBOT_PGM_ACCESS_KEY" => &mut cfg.integrations.pgm.access_key,
            "CHATBOT_LAB_API_KEY" => &mut cfg.integrations.chatbot_lab.api_key,
            "DIALOGFLOW_ACCESS_TOKEN" => &mut cfg.integrations.dialogflow.access_token,
            _ => continue,
        };
        *slot = value;
    }
}

fn validate_runtime_support(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.environment.trim().is_empty() {
        return Err(ConfigError::UnsupportedConfig(
            "server.environment must not be empty".to_string(),
        ));
    }
    for token in &cfg.auth.tokens {
        let digest = token.token_sha256.trim();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::UnsupportedConfig(format!(
                "auth.tokens[{}].token_sha256 must be 64 hex characters",
                token.username
            )));
        }
        if let Some(expires_at) = &token.expires_at {
            if !looks_like_rfc3339(expires_at) {
                return Err(ConfigError::UnsupportedConfig(format!(
                    "auth.tokens[{}].expires_at must be RFC3339",
                    token.username
                )));
            }
        }
    }
    if cfg.integrations.timeout_ms == 0 {
        return Err(ConfigError::UnsupportedConfig(
            "integrations.timeout_ms must be >= 1".to_string(),
        ));
    }
    let threshold = cfg.integrations.ipp.street_similarity_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::UnsupportedConfig(format!(
            "integrations.ipp.street_similarity_threshold={threshold} must be within [0, 1]"
        )));
    }
    if cfg.chat.division_signature.is_empty()
        || cfg.chat.buttons_signature.is_empty()
        || cfg.chat.file_signature.is_empty()
    {
        return Err(ConfigError::UnsupportedConfig(
            "chat signatures must not be empty".to_string(),
        ));
    }
    Ok(())
}

// Full parsing happens in the server with chrono; this only rejects obvious typos early.
fn looks_like_rfc3339(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 20
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && (bytes[10] == b'T' || bytes[10] == b't')
        && bytes[13] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp_config(contents: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("chatbot-webhooks-config-test-{nanos}.yaml"));
        std::fs::write(&path, contents).expect("write temp config");
        path.to_string_lossy().to_string()
    }

    fn base_yaml() -> String {
        r#"
server:
  listen_addr: "127.0.0.1:0"
  environment: "staging"

auth:
  tokens:
    - username: "dialogflow"
      token_sha256: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"

integrations:
  timeout_ms: 5000
  sgrc:
    url: "http://sgrc.local"
  google_maps:
    api_token: "gmaps"
  pgm:
    api_url: "http://pgm.local"
  chatbot_lab:
    api_url: "http://lab.local/ask"
  dialogflow:
    project_id: "proj"
    location_id: "global"
    agent_id: "agent"
"#
        .to_string()
    }

    #[test]
    fn accepts_minimal_config_and_fills_defaults() {
        let path = write_temp_config(&base_yaml());
        let cfg = load_and_validate(&path).expect("config should be accepted");
        assert_eq!(cfg.server.telephony_caller_id, "+18558363987");
        assert_eq!(cfg.integrations.ipp.street_similarity_threshold, 0.8);
        assert_eq!(cfg.chat.buttons_signature, "BUTTONOPTIONS:");
        assert_eq!(cfg.integrations.dialogflow.language_code, "pt-br");
        assert!(cfg.auth.tokens[0].active);
    }

    #[test]
    fn rejects_malformed_token_digest() {
        let path = write_temp_config(&base_yaml().replace(
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
            "not-a-digest",
        ));
        let err = load_and_validate(&path).expect_err("expected unsupported config");
        assert!(matches!(
            err,
            ConfigError::SchemaValidation(_) | ConfigError::UnsupportedConfig(_)
        ));
    }

    #[test]
    fn rejects_missing_sgrc_section() {
        let path = write_temp_config(&base_yaml().replace(
            "  sgrc:\n    url: \"http://sgrc.local\"\n",
            "",
        ));
        let err = load_and_validate(&path).expect_err("expected invalid config");
        assert!(matches!(
            err,
            ConfigError::SchemaValidation(_) | ConfigError::Parse(_)
        ));
    }

    #[test]
    fn secret_overrides_replace_only_present_values() {
        let path = write_temp_config(&base_yaml());
        let mut cfg = load_and_validate(&path).unwrap();
        apply_secret_overrides(&mut cfg, |key| match key {
            "SGRC_BODY_TOKEN" => Some("from-env".to_string()),
            "GMAPS_API_TOKEN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.integrations.sgrc.body_token, "from-env");
        assert_eq!(cfg.integrations.google_maps.api_token, "gmaps");
    }

    #[test]
    fn rfc3339_shape_check() {
        assert!(looks_like_rfc3339("2026-01-01T00:00:00Z"));
        assert!(!looks_like_rfc3339("01/01/2026"));
    }
}
