use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use webhooks_config::Ipp;
use webhooks_contracts::{IppNeighborhood, IppStreet, StreetCandidate};

use super::{status_error, ClientError, StreetIndex};

/// ArcGIS REST client for the city's street locator and neighbourhood layer.
#[derive(Clone)]
pub struct IppClient {
    http: Client,
    geocode_url: String,
    neighborhood_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocode {
    address: ReverseAddress,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(rename = "CL")]
    street_code: Value,
    #[serde(rename = "Street")]
    street_name: String,
}

#[derive(Debug, Deserialize)]
struct Candidates {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    address: String,
    score: f64,
    attributes: CandidateAttributes,
}

#[derive(Debug, Deserialize)]
struct CandidateAttributes {
    #[serde(rename = "CL", default)]
    street_code: Value,
}

#[derive(Debug, Deserialize)]
struct Features {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: NeighborhoodAttributes,
}

#[derive(Debug, Deserialize)]
struct NeighborhoodAttributes {
    #[serde(alias = "CODBAIRRO")]
    codbairro: Value,
    #[serde(alias = "NOME")]
    nome: String,
}

/// Codes come back as numbers or text depending on the layer.
fn code_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn location(latitude: f64, longitude: f64) -> String {
    format!("{longitude},{latitude}")
}

impl IppClient {
    pub fn new(http: Client, cfg: &Ipp) -> Self {
        Self {
            http,
            geocode_url: cfg.geocode_url.trim_end_matches('/').to_string(),
            neighborhood_url: cfg.neighborhood_url.clone(),
        }
    }

    /// ArcGIS answers failures with `200 {"error": ...}`, so the body is checked
    /// before it is typed.
    async fn arcgis<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ClientError> {
        let response = self.http.get(url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64);
            // Reverse geocoding reports "no street here" as an error object.
            if code == Some(400) {
                return Ok(None);
            }
            return Err(ClientError::ResponseFormat(format!("arcgis error: {error}")));
        }
        Ok(Some(serde_json::from_value(body)?))
    }
}

#[async_trait]
impl StreetIndex for IppClient {
    async fn street_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<IppStreet>, ClientError> {
        let url = format!("{}/reverseGeocode", self.geocode_url);
        let found: Option<ReverseGeocode> = self
            .arcgis(
                &url,
                &[
                    ("location", location(latitude, longitude)),
                    ("f", "json".to_string()),
                ],
            )
            .await?;
        Ok(found.map(|r| IppStreet {
            street_code: code_text(&r.address.street_code),
            street_name: r.address.street_name,
        }))
    }

    async fn neighborhood_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<IppNeighborhood>, ClientError> {
        let found: Option<Features> = self
            .arcgis(
                &self.neighborhood_url,
                &[
                    ("geometry", location(latitude, longitude)),
                    ("geometryType", "esriGeometryPoint".to_string()),
                    ("inSR", "4326".to_string()),
                    ("spatialRel", "esriSpatialRelIntersects".to_string()),
                    ("outFields", "*".to_string()),
                    ("returnGeometry", "false".to_string()),
                    ("f", "json".to_string()),
                ],
            )
            .await?;
        Ok(found
            .and_then(|f| f.features.into_iter().next())
            .map(|f| IppNeighborhood {
                code: code_text(&f.attributes.codbairro),
                name: f.attributes.nome,
            }))
    }

    async fn find_streets(
        &self,
        street_name: &str,
        number: Option<&str>,
    ) -> Result<Vec<StreetCandidate>, ClientError> {
        let url = format!("{}/findAddressCandidates", self.geocode_url);
        let single_line = match number {
            Some(number) if !number.is_empty() => format!("{street_name} {number}"),
            _ => street_name.to_string(),
        };
        let found: Option<Candidates> = self
            .arcgis(
                &url,
                &[
                    ("SingleLine", single_line),
                    ("outFields", "CL".to_string()),
                    ("f", "json".to_string()),
                ],
            )
            .await?;
        Ok(found
            .map(|c| c.candidates)
            .unwrap_or_default()
            .into_iter()
            .map(|c| StreetCandidate {
                street_code: code_text(&c.attributes.street_code),
                street_name: c.address,
                score: c.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_codes_become_text() {
        assert_eq!(code_text(&json!(1234)), "1234");
        assert_eq!(code_text(&json!(" 012 ")), "012");
        assert_eq!(code_text(&Value::Null), "");
    }

    #[test]
    fn neighborhood_layer_accepts_uppercase_fields() {
        let features: Features = serde_json::from_value(json!({
            "features": [{"attributes": {"CODBAIRRO": 12, "NOME": "Botafogo"}}]
        }))
        .unwrap();
        assert_eq!(code_text(&features.features[0].attributes.codbairro), "12");
        assert_eq!(features.features[0].attributes.nome, "Botafogo");
    }
}
