//! Google Maps Platform integration (Geocoding + Street View Static).

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::{Endpoints, ImageSize, Settings};
use crate::domain::Coordinate;

/// Transport-level failures talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider answered with HTTP {0}")]
    Status(u16),
    #[error("malformed provider response: {0}")]
    Decode(String),
}

/// Parameters for one Street View Static request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRequest {
    pub location: Coordinate,
    pub size: ImageSize,
    pub heading: Option<u16>,
    pub pitch: Option<i16>,
    /// Year sent as `timestamp=<year>-01`.
    pub timestamp: Option<i32>,
}

impl ImageRequest {
    /// Query parameters in the order the provider documents them (minus the key).
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("size", self.size.to_query_value()),
            ("location", self.location.to_query_value()),
        ];
        if let Some(heading) = self.heading {
            pairs.push(("heading", heading.to_string()));
        }
        if let Some(pitch) = self.pitch {
            pairs.push(("pitch", pitch.to_string()));
        }
        pairs.push(("source", "outdoor".to_string()));
        if let Some(year) = self.timestamp {
            pairs.push(("timestamp", format!("{year}-01")));
        }
        pairs
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataResponse {
    pub status: String,
    /// Capture month, `YYYY-MM`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub pano_id: Option<String>,
}

/// The three provider calls the pipeline makes.
///
/// Each call blocks until the transport completes or its own timeout elapses.
pub trait MapsApi {
    fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError>;

    /// Raw image bytes for a successful (2xx) response.
    fn street_view_image(&self, request: &ImageRequest) -> Result<Vec<u8>, ProviderError>;

    fn street_view_metadata(&self, location: Coordinate) -> Result<MetadataResponse, ProviderError>;
}

pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    endpoints: Endpoints,
}

impl GoogleMapsClient {
    pub fn new(api_key: impl Into<String>, endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoints,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_key.clone(), settings.endpoints.clone())
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", &self.api_key)])
            .send()
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        resp.json()
            .map_err(|e| ProviderError::Decode(e.without_url().to_string()))
    }
}

impl MapsApi for GoogleMapsClient {
    fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError> {
        tracing::debug!(address, "geocode request");
        self.get_json(&self.endpoints.geocode, &[("address", address.to_string())])
    }

    fn street_view_image(&self, request: &ImageRequest) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!(
            location = %request.location,
            heading = ?request.heading,
            timestamp = ?request.timestamp,
            "street view request"
        );
        let resp = self
            .client
            .get(&self.endpoints.street_view)
            .query(&request.query_pairs())
            .query(&[("key", &self.api_key)])
            .send()
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;
        Ok(bytes.to_vec())
    }

    fn street_view_metadata(&self, location: Coordinate) -> Result<MetadataResponse, ProviderError> {
        tracing::debug!(location = %location, "street view metadata request");
        self.get_json(
            &self.endpoints.street_view_metadata,
            &[("location", location.to_query_value())],
        )
    }
}
