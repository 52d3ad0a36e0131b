//! Core library for the `geocodio` CLI.
//!
//! This crate defines:
//! - Request building for forward, reverse and batch lookups
//! - The HTTP transport and its trait seam
//! - Normalized response models, including optional `fields` annotations
//! - Configuration & credentials handling
//!
//! It is used by `geocodio-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod transport;

pub use client::Geocodio;
pub use config::Config;
pub use error::GeocodioError;
pub use model::{
    AddressComponents, BatchEntry, BatchQuery, BatchResponse, Candidate, CongressionalDistrict,
    Coordinates, Fields, GeocodeResult, Input, StateLegislativeDistrict,
    StateLegislativeDistricts, Timezone, Zip4,
};
pub use query::field;
pub use transport::{HttpTransport, Transport};
