//! Reverse geocoding
//!
//! Best-effort address lookup via OpenStreetMap Nominatim. The lookup
//! never fails outward: any network or parse problem collapses into a
//! coordinate-pair fallback label, so callers always get a displayable
//! string.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::coords::Coordinates;

/// Nominatim usage policy requires a descriptive client identifier
const USER_AGENT: &str = "Rushr Emergency Services App";

const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoding transport failure
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    Parse(String),
}

/// HTTP transport for the geocoding service, injectable for tests
#[async_trait]
pub trait GeocodeTransport: Send + Sync {
    /// GET the URL with the given User-Agent, returning the body
    async fn get(&self, url: &Url, user_agent: &str) -> Result<String, GeocodeError>;
}

/// Transport backed by a blocking reqwest client, driven from async
/// code through `smol::unblock`
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeTransport for HttpTransport {
    async fn get(&self, url: &Url, user_agent: &str) -> Result<String, GeocodeError> {
        let client = self.client.clone();
        let url = url.clone();
        let user_agent = user_agent.to_string();
        smol::unblock(move || {
            let response = client
                .get(url.as_str())
                .header(reqwest::header::USER_AGENT, user_agent)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .map_err(|e| GeocodeError::Request(e.to_string()))?;
            response
                .text()
                .map_err(|e| GeocodeError::Request(e.to_string()))
        })
        .await
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
}

/// Coordinate-to-address resolver
pub struct ReverseGeocoder {
    transport: Arc<dyn GeocodeTransport>,
    endpoint: String,
}

impl ReverseGeocoder {
    /// Resolver talking to the public Nominatim instance
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn GeocodeTransport>) -> Self {
        Self {
            transport,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the resolver at a different Nominatim-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Resolve coordinates to a display address
    ///
    /// Returns the service's `display_name` when one resolves; on any
    /// failure, or when the response carries no name, returns the
    /// 4-decimal coordinate label instead.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> String {
        let fallback = Coordinates::new(latitude, longitude).label();
        match self.lookup(latitude, longitude).await {
            Ok(Some(name)) => {
                tracing::debug!(%name, "reverse geocoded");
                name
            }
            Ok(None) => fallback,
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocoding failed; using coordinate label");
                fallback
            }
        }
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>, GeocodeError> {
        let mut url =
            Url::parse(&self.endpoint).map_err(|e| GeocodeError::Request(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("addressdetails", "1");

        let body = self.transport.get(&url, USER_AGENT).await?;
        let parsed: NominatimResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
        Ok(parsed.display_name)
    }
}

impl Default for ReverseGeocoder {
    fn default() -> Self {
        Self::new()
    }
}
