use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::GeocodioError,
    model::{BatchQuery, BatchResponse, Coordinates, GeocodeResult, WireBatchResponse},
    query::{self, field},
    transport::{HttpTransport, Request, Transport, decode},
};

const GEOCODE_PATH: &str = "/geocode";
const REVERSE_PATH: &str = "/reverse";

/// Environment variable read by [`Geocodio::from_env`].
pub const API_KEY_ENV: &str = "GEOCODIO_API_KEY";

/// Client for the Geocodio API.
///
/// Holds only immutable configuration, so a single instance can be shared
/// across tasks. Every operation performs at most one HTTP exchange and
/// stays usable after any error.
#[derive(Debug)]
pub struct Geocodio {
    transport: Box<dyn Transport>,
}

impl Geocodio {
    /// Client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeocodioError> {
        let transport = HttpTransport::new(api_key.into())?;
        Ok(Self::with_transport(transport))
    }

    /// Client keyed from `GEOCODIO_API_KEY`.
    pub fn from_env() -> Result<Self, GeocodioError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| GeocodioError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Client keyed from the environment or, failing that, the config file.
    pub fn from_config(config: &Config) -> Result<Self, GeocodioError> {
        let api_key = config.resolve_api_key().ok_or(GeocodioError::MissingApiKey)?;
        let transport = HttpTransport::builder(api_key).timeout(config.timeout()).build()?;
        Ok(Self::with_transport(transport))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self { transport: Box::new(transport) }
    }

    /// Forward geocodes a single address.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields::<&str>(address, &[]).await
    }

    /// Forward geocodes and asks for extra `fields`; each one is billed as a
    /// separate lookup.
    #[instrument(skip(self, fields), fields(fields = ?query::fields_param(fields)))]
    pub async fn geocode_return_fields<S: AsRef<str> + Sync>(
        &self,
        address: &str,
        fields: &[S],
    ) -> Result<GeocodeResult, GeocodioError> {
        let params = query::forward(address, fields)?;
        self.lookup(Request::get(GEOCODE_PATH, params)).await
    }

    pub async fn geocode_and_return_timezone(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields(address, &[field::TIMEZONE]).await
    }

    pub async fn geocode_and_return_zip4(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields(address, &[field::ZIP4]).await
    }

    pub async fn geocode_and_return_congressional_district(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields(address, &[field::CONGRESSIONAL_DISTRICT]).await
    }

    pub async fn geocode_and_return_state_legislative_districts(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields(address, &[field::STATE_LEGISLATIVE_DISTRICTS]).await
    }

    pub async fn geocode_and_return_congress_and_state_districts(
        &self,
        address: &str,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.geocode_return_fields(
            address,
            &[field::CONGRESSIONAL_DISTRICT, field::STATE_LEGISLATIVE_DISTRICTS],
        )
        .await
    }

    /// Reverse geocodes a single point. `(0.0, 0.0)` is rejected as unset.
    pub async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields::<&str>(latitude, longitude, &[]).await
    }

    #[instrument(skip(self, fields), fields(fields = ?query::fields_param(fields)))]
    pub async fn reverse_return_fields<S: AsRef<str> + Sync>(
        &self,
        latitude: f64,
        longitude: f64,
        fields: &[S],
    ) -> Result<GeocodeResult, GeocodioError> {
        let params = query::reverse(latitude, longitude, fields)?;
        self.lookup(Request::get(REVERSE_PATH, params)).await
    }

    pub async fn reverse_and_return_timezone(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields(latitude, longitude, &[field::TIMEZONE]).await
    }

    pub async fn reverse_and_return_zip4(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields(latitude, longitude, &[field::ZIP4]).await
    }

    pub async fn reverse_and_return_congressional_district(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields(latitude, longitude, &[field::CONGRESSIONAL_DISTRICT]).await
    }

    pub async fn reverse_and_return_state_legislative_districts(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields(latitude, longitude, &[field::STATE_LEGISLATIVE_DISTRICTS])
            .await
    }

    pub async fn reverse_and_return_congress_and_state_districts(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResult, GeocodioError> {
        self.reverse_return_fields(
            latitude,
            longitude,
            &[field::CONGRESSIONAL_DISTRICT, field::STATE_LEGISLATIVE_DISTRICTS],
        )
        .await
    }

    /// Forward geocodes several addresses in one request.
    pub async fn batch_geocode<A: AsRef<str> + Sync>(
        &self,
        addresses: &[A],
    ) -> Result<BatchResponse, GeocodioError> {
        self.batch_geocode_return_fields::<A, &str>(addresses, &[]).await
    }

    #[instrument(skip_all, fields(count = addresses.len(), fields = ?query::fields_param(fields)))]
    pub async fn batch_geocode_return_fields<A: AsRef<str> + Sync, S: AsRef<str> + Sync>(
        &self,
        addresses: &[A],
        fields: &[S],
    ) -> Result<BatchResponse, GeocodioError> {
        let body = query::batch_forward(addresses)?;
        let submitted = body.iter().cloned().map(BatchQuery::Address).collect();
        self.batch_lookup(Request::post(GEOCODE_PATH, body, fields_params(fields)), submitted)
            .await
    }

    /// Reverse geocodes several points in one request.
    pub async fn batch_reverse(
        &self,
        coordinates: &[Coordinates],
    ) -> Result<BatchResponse, GeocodioError> {
        self.batch_reverse_return_fields::<&str>(coordinates, &[]).await
    }

    #[instrument(skip_all, fields(count = coordinates.len(), fields = ?query::fields_param(fields)))]
    pub async fn batch_reverse_return_fields<S: AsRef<str> + Sync>(
        &self,
        coordinates: &[Coordinates],
        fields: &[S],
    ) -> Result<BatchResponse, GeocodioError> {
        let body = query::batch_reverse(coordinates)?;
        let submitted = coordinates.iter().copied().map(BatchQuery::Coordinates).collect();
        self.batch_lookup(Request::post(REVERSE_PATH, body, fields_params(fields)), submitted)
            .await
    }

    async fn lookup(&self, request: Request) -> Result<GeocodeResult, GeocodioError> {
        let raw = self.transport.send(&request).await?;
        let result: GeocodeResult = decode(&raw)?;

        if result.is_empty() {
            return Err(GeocodioError::NoResultsFound);
        }

        debug!(candidates = result.results.len(), "Lookup succeeded");
        Ok(result.with_raw(raw))
    }

    async fn batch_lookup(
        &self,
        request: Request,
        submitted: Vec<BatchQuery>,
    ) -> Result<BatchResponse, GeocodioError> {
        let raw = self.transport.send(&request).await?;
        let wire: WireBatchResponse = decode(&raw)?;

        if wire.results.iter().all(|entry| entry.response.is_empty()) {
            return Err(GeocodioError::NoResultsFound);
        }

        let batch = wire.into_response(submitted, raw)?;
        debug!(entries = batch.len(), "Batch lookup succeeded");
        Ok(batch)
    }
}

fn fields_params<S: AsRef<str>>(fields: &[S]) -> Vec<(&'static str, String)> {
    query::fields_param(fields).map(|f| vec![("fields", f)]).unwrap_or_default()
}
