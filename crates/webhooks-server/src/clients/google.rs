use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use webhooks_config::GoogleMaps;
use webhooks_contracts::GeocodedAddress;

use super::{status_error, ClientError, Geocoder};

#[derive(Clone)]
pub struct GoogleGeocoder {
    http: Client,
    url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResult {
    fn component(&self, kinds: &[&str]) -> Option<&AddressComponent> {
        kinds.iter().find_map(|kind| {
            self.address_components
                .iter()
                .find(|c| c.types.iter().any(|t| t == kind))
        })
    }

    fn long_name(&self, kinds: &[&str]) -> Option<String> {
        self.component(kinds).map(|c| c.long_name.clone())
    }

    fn into_address(self) -> GeocodedAddress {
        GeocodedAddress {
            street_name: self.long_name(&["route"]),
            number: self.long_name(&["street_number"]),
            neighborhood: self.long_name(&["sublocality_level_1", "sublocality", "neighborhood"]),
            city: self.long_name(&["administrative_area_level_2", "locality"]),
            state: self
                .component(&["administrative_area_level_1"])
                .map(|c| c.short_name.clone()),
            zip_code: self.long_name(&["postal_code"]),
            point_of_interest: self.long_name(&["point_of_interest", "establishment"]),
            latitude: self.geometry.location.lat,
            longitude: self.geometry.location.lng,
            formatted_address: self.formatted_address,
        }
    }
}

impl GoogleGeocoder {
    pub fn new(http: Client, cfg: &GoogleMaps) -> Self {
        Self {
            http,
            url: cfg.geocode_url.clone(),
            api_token: cfg.api_token.clone(),
        }
    }
}

fn first_address(response: GeocodeResponse) -> Result<Option<GeocodedAddress>, ClientError> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .next()
            .map(GeocodeResult::into_address)),
        "ZERO_RESULTS" => Ok(None),
        status => Err(ClientError::ResponseFormat(format!(
            "geocoder status {status}: {}",
            response.error_message.unwrap_or_default()
        ))),
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ClientError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("address", address),
                ("key", self.api_token.as_str()),
                ("language", "pt-BR"),
                ("region", "br"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        first_address(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_components_from_first_result() {
        let response: GeocodeResponse = serde_json::from_value(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "R. São Clemente, 360 - Botafogo, Rio de Janeiro - RJ, 22260-006, Brasil",
                "address_components": [
                    {"long_name": "360", "short_name": "360", "types": ["street_number"]},
                    {"long_name": "Rua São Clemente", "short_name": "R. São Clemente", "types": ["route"]},
                    {"long_name": "Botafogo", "short_name": "Botafogo", "types": ["sublocality_level_1", "sublocality", "political"]},
                    {"long_name": "Rio de Janeiro", "short_name": "Rio de Janeiro", "types": ["administrative_area_level_2", "political"]},
                    {"long_name": "Rio de Janeiro", "short_name": "RJ", "types": ["administrative_area_level_1", "political"]},
                    {"long_name": "22260-006", "short_name": "22260-006", "types": ["postal_code"]}
                ],
                "geometry": {"location": {"lat": -22.9519, "lng": -43.1875}}
            }]
        }))
        .unwrap();
        let address = first_address(response).unwrap().unwrap();
        assert_eq!(address.street_name.as_deref(), Some("Rua São Clemente"));
        assert_eq!(address.number.as_deref(), Some("360"));
        assert_eq!(address.neighborhood.as_deref(), Some("Botafogo"));
        assert_eq!(address.city.as_deref(), Some("Rio de Janeiro"));
        assert_eq!(address.state.as_deref(), Some("RJ"));
        assert_eq!(address.point_of_interest, None);
    }

    #[test]
    fn zero_results_is_not_an_error() {
        let response: GeocodeResponse =
            serde_json::from_value(json!({"status": "ZERO_RESULTS", "results": []})).unwrap();
        assert_eq!(first_address(response).unwrap(), None);
        let response: GeocodeResponse =
            serde_json::from_value(json!({"status": "REQUEST_DENIED", "error_message": "bad key"}))
                .unwrap();
        assert!(first_address(response).is_err());
    }
}
