//! Address → coordinate resolution.

use crate::data::google::{MapsApi, ProviderError};
use crate::domain::Coordinate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocodeError {
    #[error("address is empty")]
    EmptyAddress,
    #[error("geocoder returned status {status}")]
    Status {
        status: String,
        message: Option<String>,
    },
    #[error("geocoder returned OK without results")]
    NoResults,
    #[error("geocoder returned a non-finite coordinate")]
    InvalidCoordinate,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Resolve `address` to the first result's location.
///
/// No retry: a single failed call ends the run.
pub fn geocode(api: &dyn MapsApi, address: &str) -> Result<Coordinate, GeocodeError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(GeocodeError::EmptyAddress);
    }

    let resp = api.geocode(address)?;
    if resp.status != "OK" {
        return Err(GeocodeError::Status {
            status: resp.status,
            message: resp.error_message,
        });
    }

    let first = resp.results.first().ok_or(GeocodeError::NoResults)?;
    let loc = first.geometry.location;
    if !(loc.lat.is_finite() && loc.lng.is_finite()) {
        return Err(GeocodeError::InvalidCoordinate);
    }

    let coordinate = Coordinate::new(loc.lat, loc.lng);
    tracing::info!(
        %coordinate,
        resolved = first.formatted_address.as_deref().unwrap_or(address),
        "geocoded address"
    );
    Ok(coordinate)
}
